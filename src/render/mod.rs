//! Embedding layer: inject host data, evaluate, unwrap the text.
//!
//! A [`Renderer`] collects top-level bindings (template data and helper
//! functions). Every call to [`Renderer::render`] builds a fresh global
//! scope, declares each binding into it, and evaluates the program, so two
//! renders never observe each other's `set` statements.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::ast::Node;
use crate::diagnostics::error_codes::load;
use crate::interpreter::{host, Environment, Interpreter, RuntimeError, Value};

/// Failure to load inputs or to render them
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid AST in {origin}: {message}")]
    Ast { origin: String, message: String },

    #[error("invalid data in {origin}: {message}")]
    Data { origin: String, message: String },

    #[error("invalid config in {origin}: {message}")]
    Config { origin: String, message: String },

    #[error(transparent)]
    Render(#[from] RuntimeError),
}

// Written by hand rather than derived: `RuntimeError` has an inherent
// `code()` that shadows `Diagnostic::code` inside the derive's `forward`.
impl Diagnostic for LoadError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            LoadError::Io { .. } => Some(Box::new("stencil::io")),
            LoadError::Ast { .. } => Some(Box::new("stencil::invalid_ast")),
            LoadError::Data { .. } => Some(Box::new("stencil::invalid_data")),
            LoadError::Config { .. } => Some(Box::new("stencil::invalid_config")),
            LoadError::Render(inner) => Diagnostic::code(inner),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            LoadError::Render(inner) => Diagnostic::severity(inner),
            _ => None,
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            LoadError::Render(inner) => Diagnostic::help(inner),
            _ => None,
        }
    }

    fn url<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            LoadError::Render(inner) => Diagnostic::url(inner),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            LoadError::Render(inner) => Diagnostic::source_code(inner),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        match self {
            LoadError::Render(inner) => Diagnostic::labels(inner),
            _ => None,
        }
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        match self {
            LoadError::Render(inner) => Diagnostic::related(inner),
            _ => None,
        }
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        match self {
            LoadError::Render(inner) => Diagnostic::diagnostic_source(inner),
            _ => None,
        }
    }
}

impl LoadError {
    /// Stable short code
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::Io { .. } => load::IO,
            LoadError::Ast { .. } => load::INVALID_AST,
            LoadError::Data { .. } => load::INVALID_DATA,
            LoadError::Config { .. } => load::INVALID_CONFIG,
            LoadError::Render(inner) => inner.code(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Top-level bindings plus the evaluator
#[derive(Debug, Default)]
pub struct Renderer {
    interpreter: Interpreter,
    bindings: Vec<(String, Value)>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to any serializable host value
    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, RuntimeError> {
        let value = host::to_value(value)?;
        self.bindings.push((name.into(), value));
        Ok(self)
    }

    /// Bind `name` to a JSON value
    pub fn insert_json(
        &mut self,
        name: impl Into<String>,
        value: &JsonValue,
    ) -> Result<&mut Self, RuntimeError> {
        let value = host::from_json(value)?;
        self.bindings.push((name.into(), value));
        Ok(self)
    }

    /// Bind every key of a JSON object
    pub fn insert_all(&mut self, data: &Map<String, JsonValue>) -> Result<&mut Self, RuntimeError> {
        for (name, value) in data {
            self.insert_json(name.clone(), value)?;
        }
        Ok(self)
    }

    /// Bind `name` to a host helper function
    pub fn insert_function<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(Vec<JsonValue>) -> Result<Option<JsonValue>, String> + 'static,
    {
        self.bindings
            .push((name.to_string(), host::host_function(name, func)));
        self
    }

    /// Bind `name` to an already-built runtime value
    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.bindings.push((name.into(), value));
        self
    }

    /// Names bound so far, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }

    /// Build a global scope holding every binding
    pub fn globals(&self) -> Result<Environment<'static>, RuntimeError> {
        let env = Environment::new();
        for (name, value) in &self.bindings {
            env.declare(name.clone(), value.clone())?;
        }
        Ok(env)
    }

    /// Render `program` against a fresh global scope
    pub fn render(&self, program: &Node) -> Result<String, RuntimeError> {
        let _span = tracing::debug_span!("render", bindings = self.bindings.len()).entered();
        let env = self.globals()?;
        let output = self.interpreter.render(program, &env)?;
        tracing::debug!(bytes = output.len(), "render complete");
        Ok(output)
    }
}

/// Parse an AST from JSON text
pub fn parse_ast(input: &str, origin: &str) -> Result<Node, LoadError> {
    Node::from_json(input).map_err(|e| LoadError::Ast {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

/// Read an AST JSON file
pub fn load_ast(path: &Path) -> Result<Node, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_ast(&content, &path.display().to_string())
}

/// Parse template data; TOML when `is_toml`, JSON otherwise.
///
/// The top level must be an object: its keys become the global variables.
pub fn parse_data(
    input: &str,
    is_toml: bool,
    origin: &str,
) -> Result<Map<String, JsonValue>, LoadError> {
    let data_error = |message: String| LoadError::Data {
        origin: origin.to_string(),
        message,
    };
    let json = if is_toml {
        let table: toml::Table = toml::from_str(input).map_err(|e| data_error(e.to_string()))?;
        serde_json::to_value(table).map_err(|e| data_error(e.to_string()))?
    } else {
        serde_json::from_str(input).map_err(|e| data_error(e.to_string()))?
    };
    match json {
        JsonValue::Object(map) => Ok(map),
        other => Err(data_error(format!(
            "top-level data must be an object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Read a data file, choosing the format by extension
pub fn load_data(path: &Path) -> Result<Map<String, JsonValue>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    parse_data(&content, is_toml, &path.display().to_string())
}

/// Overlay `top` onto `base`, key by key
pub fn merge_data(base: &mut Map<String, JsonValue>, top: Map<String, JsonValue>) {
    for (key, value) in top {
        base.insert(key, value);
    }
}

/// Render an AST given as JSON against data given as a JSON object
pub fn render_json(ast: &str, data: &str) -> Result<String, LoadError> {
    let program = parse_ast(ast, "<ast>")?;
    let data = parse_data(data, false, "<data>")?;
    let mut renderer = Renderer::new();
    renderer.insert_all(&data)?;
    Ok(renderer.render(&program)?)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
