//! Binary and unary operator semantics.
//!
//! Dispatch is on the pair of operand type tags:
//!
//! | Operands | Defined operators |
//! |---|---|
//! | either Null | none (null operation error) |
//! | Numeric, Numeric | `+ - * / %`, `== != < <= > >=` |
//! | Boolean, Boolean | `and`, `or`, `!=` |
//! | anything else | `+` (concatenation), `==`, `!=` |
//!
//! Both operands are always evaluated before dispatch; `and`/`or` do not
//! short-circuit.

use crate::ast::{BinaryOp, UnaryOp};

use super::error::RuntimeError;
use super::value::{values_equal, Value};

/// Apply a binary operator to two evaluated operands
pub fn eval_binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Err(RuntimeError::null_operation(
            op,
            left.kind(),
            right.kind(),
        )),
        (Value::Numeric(a), Value::Numeric(b)) => eval_numeric_op(op, *a, *b),
        (Value::Boolean(a), Value::Boolean(b)) => match op {
            BinaryOp::And => Ok(Value::Boolean(*a && *b)),
            BinaryOp::Or => Ok(Value::Boolean(*a || *b)),
            BinaryOp::Ne => Ok(Value::Boolean(a != b)),
            _ => Err(unsupported(op, left, right)),
        },
        _ => match op {
            BinaryOp::Add => Ok(Value::String(format!("{}{}", left, right))),
            BinaryOp::Eq => Ok(Value::Boolean(values_equal(left, right))),
            BinaryOp::Ne => Ok(Value::Boolean(!values_equal(left, right))),
            _ => Err(unsupported(op, left, right)),
        },
    }
}

fn eval_numeric_op(op: BinaryOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
    let value = match op {
        // Division and remainder follow IEEE 754: x / 0 is infinite or NaN
        BinaryOp::Add => Value::Numeric(a + b),
        BinaryOp::Sub => Value::Numeric(a - b),
        BinaryOp::Mul => Value::Numeric(a * b),
        BinaryOp::Div => Value::Numeric(a / b),
        BinaryOp::Mod => Value::Numeric(a % b),
        BinaryOp::Eq => Value::Boolean(a == b),
        BinaryOp::Ne => Value::Boolean(a != b),
        BinaryOp::Lt => Value::Boolean(a < b),
        BinaryOp::Le => Value::Boolean(a <= b),
        BinaryOp::Gt => Value::Boolean(a > b),
        BinaryOp::Ge => Value::Boolean(a >= b),
        BinaryOp::And | BinaryOp::Or => {
            return Err(RuntimeError::unknown_operator(op, "Numeric and Numeric"))
        }
    };
    Ok(value)
}

/// Apply a unary operator to an evaluated operand
pub fn eval_unary_op(op: UnaryOp, operand: &Value) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Not => Ok(Value::Boolean(!operand.is_truthy())),
        UnaryOp::Neg => Err(RuntimeError::unknown_operator(
            op,
            operand.kind().to_string(),
        )),
    }
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::unknown_operator(op, format!("{} and {}", left.kind(), right.kind()))
}
