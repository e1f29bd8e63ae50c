pub mod builtins;
pub mod env;
pub mod operations;
pub mod value;


use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::Diagnostics;
use crate::lexer::token::Span;
use crate::parser::ast::{BinaryOp, Expr, FunDecl, Stmt};
use builtins::{builtin_table, call_builtin, Builtin};
use env::Env;
use value::Value;

/// Where program output goes. `write_line` appends a single newline.
pub trait OutputSink {
    fn write(&mut self, text: &str);
    fn write_line(&mut self, text: &str);
}

/// Writes program output to the process stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, text: &str) {
        print!("{}", text);
    }

    fn write_line(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Captures program output in memory; used by tests and the JSON output
/// mode.
#[derive(Debug, Default)]
pub struct StringSink {
    pub contents: String,
}

impl OutputSink for StringSink {
    fn write(&mut self, text: &str) {
        self.contents.push_str(text);
    }

    fn write_line(&mut self, text: &str) {
        self.contents.push_str(text);
        self.contents.push('\n');
    }
}

/// A runtime failure. Carries the span of the expression or statement
/// that raised it; the driver reports it to the diagnostics sink.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub message: String,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Outcome of executing one statement. `return` unwinds as a value, not
/// a host exception; the nearest function-call site consumes it.
enum Flow {
    Normal,
    Return(Value),
}

/// Execute a program. Every top-level `fun` is registered up front so
/// forward references work. A runtime error ends execution and is
/// reported to the sink; a top-level `return` is formatted to the
/// output sink and execution continues.
pub fn interpret(program: &[Stmt], sink: &mut dyn OutputSink, diagnostics: &mut Diagnostics) {
    let mut interpreter = Interpreter::new(sink);
    interpreter.register_functions(program);

    for stmt in program {
        match interpreter.exec(stmt) {
            Ok(Flow::Normal) => {}
            Ok(Flow::Return(value)) => interpreter.sink.write_line(&value.to_string()),
            Err(error) => {
                diagnostics.report(error.message, error.span);
                return;
            }
        }
    }
}

struct Interpreter<'a> {
    functions: HashMap<String, Rc<FunDecl>>,
    builtins: HashMap<&'static str, Builtin>,
    env: Rc<RefCell<Env>>,
    sink: &'a mut dyn OutputSink,
}

impl<'a> Interpreter<'a> {
    fn new(sink: &'a mut dyn OutputSink) -> Self {
        Self {
            functions: HashMap::new(),
            builtins: builtin_table(),
            env: Rc::new(RefCell::new(Env::new())),
            sink,
        }
    }

    fn register_functions(&mut self, program: &[Stmt]) {
        for stmt in program {
            if let Stmt::Fun(decl) = stmt {
                self.functions.insert(decl.name.clone(), Rc::new(decl.clone()));
            }
        }
    }

    // ===== Statements =====

    fn exec(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expr { expr, .. } => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Let { name, init, .. } => {
                let value = self.eval(init)?;
                self.env.borrow_mut().define(name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Assign {
                name,
                name_span,
                value,
                ..
            } => {
                let value = self.eval(value)?;
                self.env.borrow_mut().set(name, value, *name_span)?;
                Ok(Flow::Normal)
            }
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.exec(then)
                } else if let Some(otherwise) = otherwise {
                    self.exec(otherwise)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body, .. } => {
                while self.eval(cond)?.is_truthy() {
                    if let Flow::Return(value) = self.exec(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Block { stmts, .. } => self.exec_scoped(stmts),
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            // Functions were registered before execution started; a
            // nested declaration registers on first execution.
            Stmt::Fun(decl) => {
                self.functions
                    .entry(decl.name.clone())
                    .or_insert_with(|| Rc::new(decl.clone()));
                Ok(Flow::Normal)
            }
        }
    }

    /// Run statements in a fresh child scope, restoring the previous
    /// environment on every exit path.
    fn exec_scoped(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        let previous = Rc::clone(&self.env);
        self.env = Rc::new(RefCell::new(Env::child(Rc::clone(&previous))));
        let result = self.exec_sequence(stmts);
        self.env = previous;
        result
    }

    fn exec_sequence(&mut self, stmts: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    // ===== Expressions =====

    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int { value, .. } => Ok(Value::Int(*value)),
            Expr::Float { value, .. } => Ok(Value::Float(*value)),
            Expr::Str { value, .. } => Ok(Value::string(value)),
            Expr::Char { value, .. } => Ok(Value::Char(*value)),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Ident { name, span } => self.env.borrow().get(name, *span),
            Expr::Grouping { inner, .. } => self.eval(inner),
            Expr::Unary { op, operand, span } => {
                let operand = self.eval(operand)?;
                operations::apply_unary(*op, operand, *span)
            }
            Expr::Binary {
                left,
                op,
                right,
                span,
            } => match op {
                // Short-circuit: the result is the deciding operand.
                BinaryOp::And => {
                    let left = self.eval(left)?;
                    if !left.is_truthy() {
                        return Ok(left);
                    }
                    self.eval(right)
                }
                BinaryOp::Or => {
                    let left = self.eval(left)?;
                    if left.is_truthy() {
                        return Ok(left);
                    }
                    self.eval(right)
                }
                _ => {
                    let left = self.eval(left)?;
                    let right = self.eval(right)?;
                    operations::apply_binary(*op, left, right, *span)
                }
            },
            Expr::Call { callee, args, span } => self.eval_call(callee, args, *span),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<Value, RuntimeError> {
        let name = match callee {
            Expr::Ident { name, .. } => name.as_str(),
            _ => {
                return Err(RuntimeError::new("Can only call named functions", span));
            }
        };

        if let Some(builtin) = self.builtins.get(name).copied() {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.eval(arg)?);
            }
            if builtin.arity >= 0 && values.len() != builtin.arity as usize {
                return Err(RuntimeError::new(
                    format!("Expected {} arguments but got {}", builtin.arity, values.len()),
                    span,
                ));
            }
            return Ok(call_builtin(builtin.name, &values, self.sink));
        }

        let decl = match self.functions.get(name) {
            Some(decl) => Rc::clone(decl),
            None => {
                return Err(RuntimeError::new(
                    format!("Undefined function '{}'", name),
                    span,
                ));
            }
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        self.call_function(&decl, values, span)
    }

    /// Invoke a user function: a fresh child frame of the *current*
    /// environment, arguments bound in order, body run under the frame,
    /// and the previous environment restored on every exit path. A
    /// `return` unwinds here; falling off the end yields null.
    fn call_function(
        &mut self,
        decl: &FunDecl,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if args.len() != decl.params.len() {
            return Err(RuntimeError::new(
                format!("Expected {} arguments but got {}", decl.params.len(), args.len()),
                span,
            ));
        }

        let previous = Rc::clone(&self.env);
        self.env = Rc::new(RefCell::new(Env::child(Rc::clone(&previous))));
        for (param, value) in decl.params.iter().zip(args) {
            self.env.borrow_mut().define(param.name.clone(), value);
        }

        let result = self.exec_sequence(&decl.body);
        self.env = previous;

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }
}
