//! Configuration for the `stencil` command (stencil.toml)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};

use crate::render::LoadError;

/// File name looked up during discovery
pub const CONFIG_FILE: &str = "stencil.toml";

/// Stencil configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default template data, overridden key-by-key by data files
    #[serde(default)]
    pub globals: toml::Table,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Append a newline to the rendered text
    #[serde(default)]
    pub trailing_newline: bool,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration from a string
    pub fn parse(content: &str, origin: &str) -> Result<Self, LoadError> {
        toml::from_str(content).map_err(|e| LoadError::Config {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String, LoadError> {
        toml::to_string_pretty(self).map_err(|e| LoadError::Config {
            origin: CONFIG_FILE.to_string(),
            message: e.to_string(),
        })
    }

    /// Find `stencil.toml` in the given directories, first match wins
    pub fn discover(dirs: &[&Path]) -> Option<PathBuf> {
        dirs.iter()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// The `[globals]` table as JSON
    pub fn globals_json(&self) -> Result<Map<String, JsonValue>, LoadError> {
        let config_error = |message: String| LoadError::Config {
            origin: CONFIG_FILE.to_string(),
            message,
        };
        match serde_json::to_value(&self.globals).map_err(|e| config_error(e.to_string()))? {
            JsonValue::Object(map) => Ok(map),
            _ => Err(config_error("[globals] must be a table".to_string())),
        }
    }
}
