//! Tree-walking evaluator for Stencil templates
//!
//! Every node evaluates to a [`Value`]. Statement sequences fold into a single
//! String: each statement is evaluated in order and the printed form of every
//! non-Null result is appended to the output. `Set` yields Null, so it renders
//! nothing; a bare expression renders its value.

pub mod environment;
pub mod error;
pub mod host;
pub mod methods;
pub mod operators;
pub mod value;

use std::collections::BTreeMap;

use crate::ast::{Node, Numeral};

pub use environment::Environment;
pub use error::RuntimeError;
pub use methods::{builtin_member, Method};
pub use operators::{eval_binary_op, eval_unary_op};
pub use value::{format_number, values_equal, Function, Value, ValueKind};

/// The evaluator.
///
/// Holds no state of its own: all bindings live in the [`Environment`]
/// passed to each call, so one interpreter (and one AST) can serve any
/// number of independent environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a node in `env`
    pub fn evaluate(&self, node: &Node, env: &Environment<'_>) -> Result<Value, RuntimeError> {
        tracing::trace!(node = node.kind_name(), "evaluate");
        match node {
            Node::Program { body } => self.eval_block(body, env),
            Node::Set { assignee, value } => self.eval_set(assignee, value, env),
            Node::If {
                test,
                body,
                alternate,
            } => self.eval_if(test, body, alternate, env),
            Node::For {
                loopvar,
                iterable,
                body,
            } => self.eval_for(loopvar, iterable, body, env),

            // Literals
            Node::NumericLiteral { value } => eval_numeral(value),
            Node::StringLiteral { value } => Ok(Value::String(value.clone())),
            Node::BooleanLiteral { value } => Ok(Value::Boolean(*value)),

            Node::Identifier { value } => Ok(env.lookup_variable(value)),
            Node::CallExpression { callee, args } => self.eval_call(callee, args, env),
            Node::MemberExpression {
                object,
                property,
                computed,
            } => self.eval_member(object, property, *computed, env),
            Node::UnaryExpression { operator, argument } => {
                let operand = self.evaluate(argument, env)?;
                eval_unary_op(*operator, &operand)
            }
            Node::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let left_val = self.evaluate(left, env)?;
                let right_val = self.evaluate(right, env)?;
                eval_binary_op(*operator, &left_val, &right_val)
            }
            Node::Unknown => Err(RuntimeError::UnknownNode {
                node: node.kind_name().to_string(),
            }),
        }
    }

    /// Evaluate a statement sequence into a single String
    pub fn eval_block(&self, body: &[Node], env: &Environment<'_>) -> Result<Value, RuntimeError> {
        let mut output = String::new();
        for statement in body {
            let result = self.evaluate(statement, env)?;
            if !result.is_null() {
                output.push_str(&result.to_string());
            }
        }
        Ok(Value::String(output))
    }

    /// Evaluate a program and unwrap the rendered text
    pub fn render(&self, program: &Node, env: &Environment<'_>) -> Result<String, RuntimeError> {
        match self.evaluate(program, env)? {
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }

    fn eval_set(
        &self,
        assignee: &Node,
        value: &Node,
        env: &Environment<'_>,
    ) -> Result<Value, RuntimeError> {
        let name = assignment_target(assignee)?;
        let value = self.evaluate(value, env)?;
        env.set_variable(name, value);
        Ok(Value::Null)
    }

    fn eval_if(
        &self,
        test: &Node,
        body: &[Node],
        alternate: &[Node],
        env: &Environment<'_>,
    ) -> Result<Value, RuntimeError> {
        match self.evaluate(test, env)? {
            Value::Boolean(true) => self.eval_block(body, env),
            Value::Boolean(false) => self.eval_block(alternate, env),
            other => Err(RuntimeError::type_mismatch(
                "if condition",
                "Boolean",
                other.kind(),
            )),
        }
    }

    /// Run the loop body once per array element in one shared child scope.
    ///
    /// `loop` and the loop variable are bound with `set_variable` on every
    /// pass: a name already bound in an enclosing scope is updated there,
    /// otherwise it lands in the loop scope and is dropped with it.
    fn eval_for(
        &self,
        loopvar: &Node,
        iterable: &Node,
        body: &[Node],
        env: &Environment<'_>,
    ) -> Result<Value, RuntimeError> {
        let name = assignment_target(loopvar)?;
        let items = match self.evaluate(iterable, env)? {
            Value::Array(items) => items,
            other => {
                return Err(RuntimeError::type_mismatch(
                    "for-loop iterable",
                    "Array",
                    other.kind(),
                ))
            }
        };

        let scope = env.child();
        let length = items.len();
        tracing::debug!(variable = name, length, "entering loop");

        let mut output = String::new();
        for (i, item) in items.into_iter().enumerate() {
            scope.set_variable("loop", loop_metadata(i, length));
            scope.set_variable(name, item);
            let rendered = self.eval_block(body, &scope)?;
            output.push_str(&rendered.to_string());
        }

        tracing::debug!(variable = name, "leaving loop");
        Ok(Value::String(output))
    }

    fn eval_call(
        &self,
        callee: &Node,
        args: &[Node],
        env: &Environment<'_>,
    ) -> Result<Value, RuntimeError> {
        let args = args
            .iter()
            .map(|arg| self.evaluate(arg, env))
            .collect::<Result<Vec<_>, _>>()?;
        match self.evaluate(callee, env)? {
            Value::Function(func) => func.call(args, env),
            other => Err(RuntimeError::NotCallable { kind: other.kind() }),
        }
    }

    fn eval_member(
        &self,
        object: &Node,
        property: &Node,
        computed: bool,
        env: &Environment<'_>,
    ) -> Result<Value, RuntimeError> {
        let key = match (computed, property) {
            (false, Node::Identifier { value }) => Value::String(value.clone()),
            _ => self.evaluate(property, env)?,
        };
        let Value::String(key) = key else {
            return Err(RuntimeError::type_mismatch(
                "property key",
                "String",
                key.kind(),
            ));
        };

        let object = self.evaluate(object, env)?;
        let found = match &object {
            Value::Object(fields) => fields
                .get(&key)
                .cloned()
                .or_else(|| builtin_member(&object, &key)),
            other => builtin_member(other, &key),
        };
        found.ok_or_else(|| RuntimeError::no_such_property(object.kind(), &key))
    }
}

/// Evaluate a single node against `env` with a fresh interpreter
pub fn evaluate(node: &Node, env: &Environment<'_>) -> Result<Value, RuntimeError> {
    Interpreter::new().evaluate(node, env)
}

fn eval_numeral(numeral: &Numeral) -> Result<Value, RuntimeError> {
    match numeral {
        Numeral::Number(n) => Ok(Value::Numeric(*n)),
        Numeral::Text(text) => text
            .trim()
            .parse::<f64>()
            .map(Value::Numeric)
            .map_err(|_| RuntimeError::InvalidLiteral { text: text.clone() }),
    }
}

/// The variable name an assignment or loop binds to
fn assignment_target(node: &Node) -> Result<&str, RuntimeError> {
    match node {
        Node::Identifier { value } => Ok(value),
        other => Err(RuntimeError::InvalidAssignmentTarget {
            found: other.kind_name(),
        }),
    }
}

/// The `loop` object visible inside a for-loop body
fn loop_metadata(index: usize, length: usize) -> Value {
    let fields = BTreeMap::from([
        ("index".to_string(), Value::Numeric((index + 1) as f64)),
        ("index0".to_string(), Value::Numeric(index as f64)),
        ("first".to_string(), Value::Boolean(index == 0)),
        ("last".to_string(), Value::Boolean(index + 1 == length)),
        ("length".to_string(), Value::Numeric(length as f64)),
    ]);
    Value::Object(fields)
}

#[cfg(test)]
mod tests;
