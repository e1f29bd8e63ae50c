use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;
use super::RuntimeError;
use crate::lexer::token::Span;

/// A single scope frame, linked to its enclosing frame. Lookups walk
/// outward; definitions are always local, so shadowing works.
#[derive(Debug, Default)]
pub struct Env {
    values: HashMap<String, Value>,
    parent: Option<Rc<RefCell<Env>>>,
}

impl Env {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            parent: None,
        }
    }

    pub fn child(parent: Rc<RefCell<Env>>) -> Self {
        Self {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }

        let mut current = self.parent.clone();
        while let Some(frame) = current {
            let env = frame.borrow();
            if let Some(value) = env.values.get(name) {
                return Ok(value.clone());
            }
            current = env.parent.clone();
        }

        Err(RuntimeError::new(format!("Undefined variable '{}'", name), span))
    }

    /// Mutate the nearest enclosing binding of `name`.
    pub fn set(&mut self, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return Ok(());
        }

        let mut current = self.parent.clone();
        while let Some(frame) = current {
            let mut env = frame.borrow_mut();
            if let Some(slot) = env.values.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            current = env.parent.clone();
        }

        Err(RuntimeError::new(format!("Undefined variable '{}'", name), span))
    }
}
