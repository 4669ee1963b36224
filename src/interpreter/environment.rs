//! Variable scopes for the Stencil evaluator.

use std::cell::RefCell;
use std::collections::HashMap;

use super::error::RuntimeError;
use super::value::Value;

/// One scope in a chain of scopes.
///
/// A scope borrows its parent, so a child can never outlive the scope it was
/// created from. Bindings sit behind a `RefCell` because assignment may
/// update a binding that lives in an outer scope.
#[derive(Debug, Default)]
pub struct Environment<'p> {
    /// Bindings owned by this scope
    variables: RefCell<HashMap<String, Value>>,
    /// Enclosing scope (None for the global scope)
    parent: Option<&'p Environment<'p>>,
}

impl<'p> Environment<'p> {
    /// Create a global scope with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scope nested inside this one
    pub fn child(&self) -> Environment<'_> {
        Environment {
            variables: RefCell::new(HashMap::new()),
            parent: Some(self),
        }
    }

    /// Bind `name` in this scope. Fails if this scope already binds it.
    pub fn declare(&self, name: impl Into<String>, value: Value) -> Result<Value, RuntimeError> {
        let name = name.into();
        let mut variables = self.variables.borrow_mut();
        if variables.contains_key(&name) {
            return Err(RuntimeError::duplicate_declaration(&name));
        }
        variables.insert(name, value.clone());
        Ok(value)
    }

    /// Overwrite `name` where it is bound, or bind it here if it is bound nowhere
    pub fn set_variable(&self, name: &str, value: Value) -> Value {
        let scope = self.resolve(name).unwrap_or(self);
        scope
            .variables
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        value
    }

    /// Value bound to `name`, or Null if no scope binds it
    pub fn lookup_variable(&self, name: &str) -> Value {
        match self.resolve(name) {
            Some(scope) => scope
                .variables
                .borrow()
                .get(name)
                .cloned()
                .unwrap_or(Value::Null),
            None => Value::Null,
        }
    }

    /// Innermost scope that binds `name`
    pub fn resolve(&self, name: &str) -> Option<&Environment<'p>> {
        if self.variables.borrow().contains_key(name) {
            return Some(self);
        }
        self.parent.and_then(|parent| parent.resolve(name))
    }

    /// Check if this scope itself binds `name`
    pub fn contains_local(&self, name: &str) -> bool {
        self.variables.borrow().contains_key(name)
    }

    /// Number of scopes from here to the global scope, inclusive
    pub fn depth(&self) -> usize {
        1 + self.parent.map_or(0, Environment::depth)
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
