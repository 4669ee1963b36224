//! Runtime value types for the Stencil evaluator.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::environment::Environment;
use super::error::RuntimeError;
use super::methods::Method;

/// Signature shared by every native callable
pub type NativeFn = dyn Fn(Vec<Value>, &Environment<'_>) -> Result<Value, RuntimeError>;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit float
    Numeric(f64),
    /// Text string
    String(String),
    /// Boolean
    Boolean(bool),
    /// String-keyed record
    Object(BTreeMap<String, Value>),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Callable
    Function(Function),
    /// Absence of a value; renders nothing
    Null,
}

/// Type tag of a [`Value`], used for dispatch and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Numeric,
    String,
    Boolean,
    Object,
    Array,
    Function,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Numeric => "Numeric",
            ValueKind::String => "String",
            ValueKind::Boolean => "Boolean",
            ValueKind::Object => "Object",
            ValueKind::Array => "Array",
            ValueKind::Function => "Function",
            ValueKind::Null => "Null",
        };
        f.write_str(name)
    }
}

/// A callable runtime value
#[derive(Clone)]
pub enum Function {
    /// Host-provided callable
    Native { name: Rc<str>, func: Rc<NativeFn> },
    /// Built-in method bound to its receiver by member access
    Builtin { receiver: Box<Value>, method: Method },
}

impl Function {
    /// Wrap a native closure
    pub fn native<F>(name: impl Into<Rc<str>>, func: F) -> Self
    where
        F: Fn(Vec<Value>, &Environment<'_>) -> Result<Value, RuntimeError> + 'static,
    {
        Function::Native {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Function::Native { name, .. } => name,
            Function::Builtin { method, .. } => method.name(),
        }
    }

    /// Invoke with already-evaluated arguments
    pub fn call(&self, args: Vec<Value>, env: &Environment<'_>) -> Result<Value, RuntimeError> {
        match self {
            Function::Native { func, .. } => func(args, env),
            Function::Builtin { receiver, method } => method.invoke(receiver, &args),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native { name, .. } => write!(f, "Native({})", name),
            Function::Builtin { receiver, method } => {
                write!(f, "Builtin({:?}.{})", receiver, method.name())
            }
        }
    }
}

impl Value {
    /// Type tag for dispatch
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Numeric(_) => ValueKind::Numeric,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
            Value::Function(_) => ValueKind::Function,
            Value::Null => ValueKind::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness of the payload, as used by `not`.
    ///
    /// Zero, NaN, the empty string, `false` and null are falsy; containers
    /// and functions are always truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Numeric(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Object(_) | Value::Array(_) | Value::Function(_) => true,
            Value::Null => false,
        }
    }

    /// Build an Object from key/value pairs
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Numeric(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

/// Compare two values for equality.
///
/// Containers compare structurally; functions only equal themselves.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Numeric(a), Value::Numeric(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Null, Value::Null) => true,
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Function(a), Value::Function(b)) => match (a, b) {
            (Function::Native { func: f1, .. }, Function::Native { func: f2, .. }) => {
                Rc::ptr_eq(f1, f2)
            }
            (
                Function::Builtin {
                    receiver: r1,
                    method: m1,
                },
                Function::Builtin {
                    receiver: r2,
                    method: m2,
                },
            ) => m1 == m2 && values_equal(r1, r2),
            _ => false,
        },
        _ => false,
    }
}

/// Printed form of a number: integral values drop the fraction
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// The printed form used when a value becomes template output
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Function(func) => write!(f, "[function {}]", func.name()),
            Value::Null => Ok(()),
        }
    }
}
