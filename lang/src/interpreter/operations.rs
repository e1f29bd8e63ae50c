use super::value::Value;
use super::RuntimeError;
use crate::lexer::token::Span;
use crate::parser::ast::{BinaryOp, UnaryOp};

pub fn apply_unary(op: UnaryOp, operand: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Negate => match operand {
            Value::Int(value) => Ok(Value::Int(-value)),
            Value::Float(value) => Ok(Value::Float(-value)),
            other => Err(RuntimeError::new(
                format!("Cannot apply unary '-' to {}", other.type_name()),
                span,
            )),
        },
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
    }
}

/// Apply a non-short-circuiting binary operator. `and`/`or` never reach
/// this point; the interpreter handles them before evaluating the right
/// operand.
pub fn apply_binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => add(left, right, span),
        BinaryOp::Subtract => arithmetic(left, right, span, "-", |a, b| a - b, |a, b| a - b),
        BinaryOp::Multiply => arithmetic(left, right, span, "*", |a, b| a * b, |a, b| a * b),
        BinaryOp::Divide => divide(left, right, span),
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOp::Less => comparison(left, right, span, "<", |o| o.is_lt()),
        BinaryOp::LessEqual => comparison(left, right, span, "<=", |o| o.is_le()),
        BinaryOp::Greater => comparison(left, right, span, ">", |o| o.is_gt()),
        BinaryOp::GreaterEqual => comparison(left, right, span, ">=", |o| o.is_ge()),
        BinaryOp::And | BinaryOp::Or => Err(RuntimeError::new(
            "Logical operators must short-circuit".to_string(),
            span,
        )),
    }
}

fn add(left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{}{}", a, b))),
        (Value::Str(a), Value::Char(b)) => Ok(Value::string(format!("{}{}", a, b))),
        (Value::Char(a), Value::Str(b)) => Ok(Value::string(format!("{}{}", a, b))),
        (Value::Char(a), Value::Char(b)) => Ok(Value::string(format!("{}{}", a, b))),
        _ => arithmetic(left, right, span, "+", |a, b| a + b, |a, b| a + b),
    }
}

fn arithmetic(
    left: Value,
    right: Value,
    span: Span,
    symbol: &str,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(*a, *b))),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(*a as f64, *b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(*a, *b as f64))),
        _ => Err(unsupported(symbol, &left, &right, span)),
    }
}

fn divide(left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(RuntimeError::new("Division by zero", span));
            }
            Ok(Value::Int(a / b))
        }
        (Value::Float(a), Value::Float(b)) => float_divide(*a, *b, span),
        (Value::Int(a), Value::Float(b)) => float_divide(*a as f64, *b, span),
        (Value::Float(a), Value::Int(b)) => float_divide(*a, *b as f64, span),
        _ => Err(unsupported("/", &left, &right, span)),
    }
}

fn float_divide(a: f64, b: f64, span: Span) -> Result<Value, RuntimeError> {
    if b == 0.0 {
        return Err(RuntimeError::new("Division by zero", span));
    }
    Ok(Value::Float(a / b))
}

fn comparison(
    left: Value,
    right: Value,
    span: Span,
    symbol: &str,
    test: fn(std::cmp::Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let ordering = match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => return Err(unsupported(symbol, &left, &right, span)),
    };

    // NaN comparisons are simply false.
    Ok(Value::Bool(ordering.map(test).unwrap_or(false)))
}

fn unsupported(symbol: &str, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::new(
        format!(
            "Unsupported operands for '{}': {} and {}",
            symbol,
            left.type_name(),
            right.type_name()
        ),
        span,
    )
}
