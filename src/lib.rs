//! Stencil
//!
//! Evaluation core for a Jinja-style template language: walks an
//! already-parsed template AST against a scope of variables and produces the
//! rendered text.
//!
//! ```
//! use stencil::prelude::*;
//!
//! let program = Node::program(vec![
//!     Node::string("Hello, "),
//!     Node::call(Node::member(Node::ident("name"), "upper"), vec![]),
//! ]);
//! let mut renderer = Renderer::new();
//! renderer.insert("name", "world").unwrap();
//! assert_eq!(renderer.render(&program).unwrap(), "Hello, WORLD");
//! ```

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod interpreter;
pub mod render;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ast::{BinaryOp, Node, UnaryOp};
    pub use crate::diagnostics::{Diagnostic, Severity};
    pub use crate::interpreter::{Environment, Interpreter, RuntimeError, Value};
    pub use crate::render::{LoadError, Renderer};
}
