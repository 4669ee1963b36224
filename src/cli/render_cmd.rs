//! Handler for the `stencil render` subcommand.

use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::render::{load_ast, load_data, merge_data, LoadError, Renderer};

pub(crate) fn run_render(
    ast: &Path,
    data: Option<&Path>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), LoadError> {
    let config = resolve_config(ast, config)?;
    let program = load_ast(ast)?;

    let mut globals = config.globals_json()?;
    if let Some(path) = data {
        merge_data(&mut globals, load_data(path)?);
    }

    let mut renderer = Renderer::new();
    renderer.insert_all(&globals)?;
    let mut text = renderer.render(&program)?;
    if config.output.trailing_newline {
        text.push('\n');
    }

    match output {
        Some(path) => std::fs::write(path, text).map_err(|e| LoadError::io(path, e)),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| LoadError::io(Path::new("<stdout>"), e))
        }
    }
}

/// Explicit `--config`, else stencil.toml next to the AST or in the working directory
pub(crate) fn resolve_config(ast: &Path, explicit: Option<&Path>) -> Result<Config, LoadError> {
    if let Some(path) = explicit {
        return Config::load(path);
    }

    let mut dirs = Vec::new();
    if let Some(parent) = ast.parent() {
        dirs.push(parent.to_path_buf());
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    let dirs: Vec<&Path> = dirs.iter().map(|d| d.as_path()).collect();

    match Config::discover(&dirs) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using discovered config");
            Config::load(&path)
        }
        None => Ok(Config::default()),
    }
}
