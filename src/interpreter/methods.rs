//! Built-in members for the Stencil evaluator.
//!
//! Built-ins form one stateless table keyed by (type tag, member name).
//! Properties are computed on lookup; methods are returned as a
//! [`Function::Builtin`] that carries its receiver and receives it as an
//! explicit argument when called. Objects have no built-ins yet, so lookups
//! on them only ever hit user data.

use super::error::{check_arity, RuntimeError};
use super::value::{Function, Value};

/// Built-in methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Upper,
    Lower,
    Strip,
    Title,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Upper => "upper",
            Method::Lower => "lower",
            Method::Strip => "strip",
            Method::Title => "title",
        }
    }

    /// Run the method against `receiver`
    pub fn invoke(self, receiver: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        check_arity(self.name(), args, 0)?;
        let Value::String(text) = receiver else {
            return Err(RuntimeError::type_mismatch(
                &format!("receiver of `{}`", self.name()),
                "String",
                receiver.kind(),
            ));
        };
        let result = match self {
            Method::Upper => text.to_uppercase(),
            Method::Lower => text.to_lowercase(),
            Method::Strip => text.trim().to_string(),
            Method::Title => title_case(text),
        };
        Ok(Value::String(result))
    }
}

/// Look up a built-in member of `receiver`
pub fn builtin_member(receiver: &Value, name: &str) -> Option<Value> {
    let bind = |method: Method| {
        Some(Value::Function(Function::Builtin {
            receiver: Box::new(receiver.clone()),
            method,
        }))
    };

    match (receiver, name) {
        (Value::String(s), "length") => Some(Value::Numeric(s.chars().count() as f64)),
        (Value::String(_), "upper") => bind(Method::Upper),
        (Value::String(_), "lower") => bind(Method::Lower),
        (Value::String(_), "strip") => bind(Method::Strip),
        (Value::String(_), "title") => bind(Method::Title),
        (Value::Array(items), "length") => Some(Value::Numeric(items.len() as f64)),
        _ => None,
    }
}

/// Uppercase the first letter of every whitespace-separated word
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            result.push(ch);
        } else if at_word_start {
            at_word_start = false;
            result.extend(ch.to_uppercase());
        } else {
            result.extend(ch.to_lowercase());
        }
    }
    result
}
