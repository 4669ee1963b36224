//! Command-line interface for Stencil
//!
//! Provides commands: render, check, explain

mod check_cmd;
mod explain_cmd;
pub(crate) mod render_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::diagnostics::Diagnostic;
use crate::render::LoadError;

/// Stencil - render template ASTs against JSON or TOML data
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output diagnostics as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a template AST
    Render {
        /// AST file (JSON, as produced by a template parser)
        ast: PathBuf,

        /// Template data (.json or .toml)
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Configuration file (defaults to a discovered stencil.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Load an AST and report its shape without evaluating it
    Check {
        /// AST file to check
        ast: PathBuf,
    },

    /// Explain an error code in detail
    Explain {
        /// Error code to explain (e.g., E5003)
        code: String,
    },
}

impl Cli {
    /// Run the parsed command, reporting any failure
    pub fn run(self) -> ExitCode {
        let result = match &self.command {
            Command::Render {
                ast,
                data,
                config,
                output,
            } => render_cmd::run_render(ast, data.as_deref(), config.as_deref(), output.as_deref()),
            Command::Check { ast } => check_cmd::run_check(ast, self.json),
            Command::Explain { code } => return explain_cmd::run_explain(code),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                if !self.quiet {
                    report(&error, self.json);
                }
                ExitCode::FAILURE
            }
        }
    }
}

/// Print a failure to stderr
fn report(error: &LoadError, json: bool) {
    tracing::debug!(code = error.code(), "command failed");
    let diagnostic = Diagnostic::from(error);
    if json {
        eprintln!("{}", diagnostic.to_json());
    } else {
        eprint!("{}", diagnostic.to_human_readable());
    }
}
