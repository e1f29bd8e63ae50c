use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::lexer::token::Span;
use crate::parser::ast::{BinaryOp, Expr, FunDecl, Stmt, TypeName, UnaryOp};
use crate::types::builtins::{builtin_signatures, BuiltinSignature};
use crate::types::ty::Type;

/// Type-check a program. All failures go to the sink; the AST is never
/// modified.
pub fn check(program: &[Stmt], diagnostics: &mut Diagnostics) {
    let mut checker = TypeChecker::new(diagnostics);
    checker.collect_functions(program);
    for stmt in program {
        checker.check_stmt(stmt);
    }
}

/// Signature of a user-declared function. A missing return annotation
/// accepts any return type and calls to it yield `Any`.
#[derive(Debug, Clone)]
struct FunctionSig {
    params: Vec<Type>,
    ret: Option<Type>,
}

struct TypeChecker<'d> {
    /// Variable scope, saved and restored around function bodies.
    variables: HashMap<String, Type>,
    functions: HashMap<String, FunctionSig>,
    builtins: HashMap<&'static str, BuiltinSignature>,
    /// `None` at top level; inside a function, the declared return type
    /// (or `None` again when the declaration has no annotation).
    current_return: Option<Option<Type>>,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> TypeChecker<'d> {
    fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            variables: HashMap::new(),
            functions: HashMap::new(),
            builtins: builtin_signatures(),
            current_return: None,
            diagnostics,
        }
    }

    /// First pass: register every top-level function so that calls may
    /// precede declarations.
    fn collect_functions(&mut self, program: &[Stmt]) {
        for stmt in program {
            if let Stmt::Fun(decl) = stmt {
                self.register_function(decl);
            }
        }
    }

    fn register_function(&mut self, decl: &FunDecl) {
        let params = decl
            .params
            .iter()
            .map(|param| match &param.ty {
                Some(annotation) => self.resolve_type_name(annotation),
                None => Type::Any,
            })
            .collect();
        let ret = decl.ret.as_ref().map(|annotation| self.resolve_type_name(annotation));
        self.functions.insert(decl.name.clone(), FunctionSig { params, ret });
    }

    fn resolve_type_name(&mut self, annotation: &TypeName) -> Type {
        match Type::from_name(&annotation.name) {
            Some(ty) => ty,
            None => {
                self.diagnostics.report(
                    format!("Unknown type name: {}", annotation.name),
                    annotation.span,
                );
                Type::Error
            }
        }
    }

    // ===== Statements =====

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let { name, ty, init, .. } => {
                let init_ty = self.check_expr(init);
                let bound = match ty {
                    Some(annotation) => {
                        let declared = self.resolve_type_name(annotation);
                        if !declared.accepts(&init_ty) {
                            self.diagnostics.report(
                                format!("Type mismatch: expected {}, found {}", declared, init_ty),
                                init.span(),
                            );
                        }
                        declared
                    }
                    None => init_ty,
                };
                self.variables.insert(name.clone(), bound);
            }
            Stmt::Assign {
                name,
                name_span,
                value,
                ..
            } => {
                let value_ty = self.check_expr(value);
                match self.variables.get(name).cloned() {
                    Some(existing) => {
                        if !existing.accepts(&value_ty) {
                            self.diagnostics.report(
                                format!("Type mismatch: expected {}, found {}", existing, value_ty),
                                value.span(),
                            );
                        }
                    }
                    None => {
                        self.diagnostics
                            .report(format!("Undefined variable '{}'", name), *name_span);
                    }
                }
            }
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.check_condition(cond);
                self.check_stmt(then);
                if let Some(otherwise) = otherwise {
                    self.check_stmt(otherwise);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.check_condition(cond);
                self.check_stmt(body);
            }
            Stmt::Block { stmts, .. } => {
                for stmt in stmts {
                    self.check_stmt(stmt);
                }
            }
            Stmt::Return { value, span } => {
                let value_ty = match value {
                    Some(expr) => self.check_expr(expr),
                    None => Type::Void,
                };
                if let Some(Some(declared)) = self.current_return.clone() {
                    if !declared.accepts(&value_ty) {
                        let at = value.as_ref().map(|expr| expr.span()).unwrap_or(*span);
                        self.diagnostics.report(
                            format!("Type mismatch: expected {}, found {}", declared, value_ty),
                            at,
                        );
                    }
                }
            }
            Stmt::Expr { expr, .. } => {
                self.check_expr(expr);
            }
            Stmt::Fun(decl) => self.check_fun(decl),
        }
    }

    fn check_condition(&mut self, cond: &Expr) {
        let ty = self.check_expr(cond);
        if !ty.is_error() && !ty.is_any() && ty != Type::Bool {
            self.diagnostics.report(
                format!("Expected Bool condition, found {}", ty),
                cond.span(),
            );
        }
    }

    fn check_fun(&mut self, decl: &FunDecl) {
        // Nested declarations are registered on first visit; top-level
        // ones were collected up front.
        if !self.functions.contains_key(&decl.name) {
            self.register_function(decl);
        }

        let saved_variables = std::mem::take(&mut self.variables);
        for param in &decl.params {
            let ty = match &param.ty {
                Some(annotation) => self.resolve_type_name(annotation),
                None => Type::Any,
            };
            self.variables.insert(param.name.clone(), ty);
        }
        let saved_return = self.current_return.take();
        self.current_return = Some(decl.ret.as_ref().map(|annotation| self.resolve_type_name(annotation)));

        for stmt in &decl.body {
            self.check_stmt(stmt);
        }

        self.variables = saved_variables;
        self.current_return = saved_return;
    }

    // ===== Expressions =====

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Int { .. } => Type::Int,
            Expr::Float { .. } => Type::Float,
            Expr::Str { .. } => Type::String,
            Expr::Char { .. } => Type::Char,
            Expr::Bool { .. } => Type::Bool,
            Expr::Grouping { inner, .. } => self.check_expr(inner),
            Expr::Ident { name, span } => self.check_ident(name, *span),
            Expr::Unary { op, operand, span } => {
                let operand_ty = self.check_expr(operand);
                self.check_unary(*op, operand_ty, *span)
            }
            Expr::Binary {
                left,
                op,
                right,
                span,
            } => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                self.check_binary(*op, left_ty, right_ty, *span)
            }
            Expr::Call { callee, args, span } => self.check_call(callee, args, *span),
        }
    }

    fn check_ident(&mut self, name: &str, span: Span) -> Type {
        if let Some(ty) = self.variables.get(name) {
            return ty.clone();
        }
        if let Some(sig) = self.functions.get(name) {
            return Type::Function {
                params: sig.params.clone(),
                ret: Box::new(sig.ret.clone().unwrap_or(Type::Any)),
            };
        }
        if let Some(sig) = self.builtins.get(name) {
            return Type::Function {
                params: sig.params.clone(),
                ret: Box::new(sig.ret.clone()),
            };
        }
        self.diagnostics
            .report(format!("Undefined variable or function: {}", name), span);
        Type::Error
    }

    fn check_unary(&mut self, op: UnaryOp, operand: Type, span: Span) -> Type {
        if operand.is_error() {
            return Type::Error;
        }
        match op {
            UnaryOp::Negate => match operand {
                Type::Int => Type::Int,
                Type::Float => Type::Float,
                Type::Any => Type::Any,
                _ => {
                    self.diagnostics
                        .report(format!("Cannot apply unary '-' to {}", operand), span);
                    Type::Error
                }
            },
            UnaryOp::Not => match operand {
                Type::Bool | Type::Any => Type::Bool,
                _ => {
                    self.diagnostics
                        .report(format!("Cannot apply unary '!' to {}", operand), span);
                    Type::Error
                }
            },
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: Type,
        right: Type,
        span: Span,
    ) -> Type {
        if left.is_error() || right.is_error() {
            return Type::Error;
        }

        match op {
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide => {
                // An `Any` operand defers the operator check to run time.
                if left.is_any() || right.is_any() {
                    return Type::Any;
                }
                if left == Type::Int && right == Type::Int {
                    return Type::Int;
                }
                if left.is_numeric() && right.is_numeric() {
                    return Type::Float;
                }
                if op == BinaryOp::Add {
                    let concatenates = matches!(
                        (&left, &right),
                        (Type::String, Type::String)
                            | (Type::String, Type::Char)
                            | (Type::Char, Type::String)
                            | (Type::Char, Type::Char)
                    );
                    if concatenates {
                        return Type::String;
                    }
                }
                self.diagnostics.report(
                    format!("Cannot apply '{}' to {} and {}", op, left, right),
                    span,
                );
                Type::Error
            }
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                let comparable = left.is_any()
                    || right.is_any()
                    || (left.is_numeric() && right.is_numeric())
                    || (left == Type::String && right == Type::String);
                if comparable {
                    Type::Bool
                } else {
                    self.diagnostics.report(
                        format!("Cannot apply '{}' to {} and {}", op, left, right),
                        span,
                    );
                    Type::Error
                }
            }
            // Any two types may be compared; mismatched tags are simply
            // unequal at run time.
            BinaryOp::Equal | BinaryOp::NotEqual => Type::Bool,
            // Logical operators yield one of their operands.
            BinaryOp::And | BinaryOp::Or => {
                if left == right {
                    left
                } else {
                    Type::Any
                }
            }
        }
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        let name = match callee {
            Expr::Ident { name, .. } => name.clone(),
            _ => {
                self.check_expr(callee);
                self.diagnostics.report("Can only call named functions", span);
                return Type::Error;
            }
        };

        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(arg)).collect();
        if arg_types.iter().any(Type::is_error) {
            return Type::Error;
        }

        if let Some(sig) = self.builtins.get(name.as_str()).cloned() {
            if !sig.is_variadic() {
                if args.len() != sig.arity as usize {
                    self.diagnostics.report(
                        format!("Expected {} arguments but got {}", sig.arity, args.len()),
                        span,
                    );
                    return sig.ret;
                }
                for (arg, (param, arg_ty)) in args.iter().zip(sig.params.iter().zip(&arg_types)) {
                    if !param.accepts(arg_ty) {
                        self.diagnostics.report(
                            format!("Type mismatch: expected {}, found {}", param, arg_ty),
                            arg.span(),
                        );
                    }
                }
            }
            return sig.ret;
        }

        if let Some(sig) = self.functions.get(&name).cloned() {
            if args.len() != sig.params.len() {
                self.diagnostics.report(
                    format!("Expected {} arguments but got {}", sig.params.len(), args.len()),
                    span,
                );
                return sig.ret.unwrap_or(Type::Any);
            }
            for (arg, (param, arg_ty)) in args.iter().zip(sig.params.iter().zip(&arg_types)) {
                if !param.accepts(arg_ty) {
                    self.diagnostics.report(
                        format!("Type mismatch: expected {}, found {}", param, arg_ty),
                        arg.span(),
                    );
                }
            }
            return sig.ret.unwrap_or(Type::Any);
        }

        if self.variables.contains_key(&name) {
            self.diagnostics
                .report(format!("'{}' is not a function", name), span);
        } else {
            self.diagnostics
                .report(format!("Undefined variable or function: {}", name), span);
        }
        Type::Error
    }
}
