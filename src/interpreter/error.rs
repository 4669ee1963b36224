//! Runtime error types for the Stencil evaluator.

use miette::Diagnostic;
use thiserror::Error;

use crate::diagnostics::error_codes::runtime;

use super::value::ValueKind;

/// Runtime error. Every variant aborts the current evaluation.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("cannot redeclare variable `{name}` in the same scope")]
    #[diagnostic(
        code(stencil::duplicate_declaration),
        help("each top-level binding may be injected only once")
    )]
    DuplicateDeclaration { name: String },

    #[error("invalid assignment target: expected an identifier, got {found}")]
    #[diagnostic(
        code(stencil::invalid_assignment_target),
        help("only plain variable names can be assigned")
    )]
    InvalidAssignmentTarget { found: &'static str },

    #[error("type error: {message}")]
    #[diagnostic(code(stencil::type_error))]
    TypeError { message: String },

    #[error("cannot apply `{operator}` to {left} and {right}: null operand")]
    #[diagnostic(code(stencil::null_operation))]
    NullOperation {
        operator: String,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("unknown operator `{operator}` for {operands}")]
    #[diagnostic(code(stencil::unknown_operator))]
    UnknownOperator { operator: String, operands: String },

    #[error("value of type {kind} is not callable")]
    #[diagnostic(code(stencil::not_callable))]
    NotCallable { kind: ValueKind },

    #[error("no property `{property}` on {kind}")]
    #[diagnostic(code(stencil::no_such_property))]
    NoSuchProperty { kind: ValueKind, property: String },

    #[error("unknown AST node type `{node}`")]
    #[diagnostic(code(stencil::unknown_node))]
    UnknownNode { node: String },

    #[error("cannot convert host value: {message}")]
    #[diagnostic(code(stencil::conversion_error))]
    Conversion { message: String },

    #[error("invalid numeric literal `{text}`")]
    #[diagnostic(code(stencil::invalid_literal))]
    InvalidLiteral { text: String },

    #[error("`{name}` expects {expected} arguments, got {got}")]
    #[diagnostic(code(stencil::arity_mismatch))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("host function `{name}` failed: {message}")]
    #[diagnostic(code(stencil::host_call))]
    HostCall { name: String, message: String },
}

impl RuntimeError {
    /// Stable short code (E5xxx series)
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::DuplicateDeclaration { .. } => runtime::DUPLICATE_DECLARATION,
            RuntimeError::InvalidAssignmentTarget { .. } => runtime::INVALID_ASSIGNMENT_TARGET,
            RuntimeError::TypeError { .. } => runtime::TYPE_ERROR,
            RuntimeError::NullOperation { .. } => runtime::NULL_OPERATION,
            RuntimeError::UnknownOperator { .. } => runtime::UNKNOWN_OPERATOR,
            RuntimeError::NotCallable { .. } => runtime::NOT_CALLABLE,
            RuntimeError::NoSuchProperty { .. } => runtime::NO_SUCH_PROPERTY,
            RuntimeError::UnknownNode { .. } => runtime::UNKNOWN_NODE,
            RuntimeError::Conversion { .. } => runtime::CONVERSION_ERROR,
            RuntimeError::InvalidLiteral { .. } => runtime::INVALID_LITERAL,
            RuntimeError::ArityMismatch { .. } => runtime::ARITY_MISMATCH,
            RuntimeError::HostCall { .. } => runtime::HOST_CALL_FAILED,
        }
    }

    /// Duplicate declaration in a single scope
    pub fn duplicate_declaration(name: &str) -> Self {
        Self::DuplicateDeclaration {
            name: name.to_string(),
        }
    }

    /// Type mismatch error
    pub fn type_mismatch(context: &str, expected: &str, got: ValueKind) -> Self {
        Self::TypeError {
            message: format!("{} must be {}, got {}", context, expected, got),
        }
    }

    pub fn null_operation(operator: impl ToString, left: ValueKind, right: ValueKind) -> Self {
        Self::NullOperation {
            operator: operator.to_string(),
            left,
            right,
        }
    }

    /// Operator not defined for the operand types
    pub fn unknown_operator(operator: impl ToString, operands: impl Into<String>) -> Self {
        Self::UnknownOperator {
            operator: operator.to_string(),
            operands: operands.into(),
        }
    }

    pub fn no_such_property(kind: ValueKind, property: &str) -> Self {
        Self::NoSuchProperty {
            kind,
            property: property.to_string(),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Arity mismatch error
    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }
    }
}

/// Check that `args` has exactly `expected` elements, returning an arity error if not.
pub fn check_arity<T>(name: &str, args: &[T], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        Err(RuntimeError::arity_mismatch(name, expected, args.len()))
    } else {
        Ok(())
    }
}
