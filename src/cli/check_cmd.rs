//! Handler for the `stencil check` subcommand.

use std::path::Path;

use serde::Serialize;

use crate::diagnostics::{error_codes::runtime, Diagnostic, Note};
use crate::render::{load_ast, LoadError};

/// Shape of a loaded tree
#[derive(Debug, Serialize)]
pub(crate) struct CheckReport {
    pub root: &'static str,
    pub nodes: usize,
    pub depth: usize,
    pub kinds: std::collections::BTreeMap<&'static str, usize>,
    /// Nodes the evaluator will reject as unknown
    pub unknown: usize,
}

pub(crate) fn run_check(ast: &Path, json: bool) -> Result<(), LoadError> {
    let program = load_ast(ast)?;
    let report = check_report(&program);

    if json {
        let text = serde_json::to_string(&report).map_err(|e| LoadError::Ast {
            origin: ast.display().to_string(),
            message: e.to_string(),
        })?;
        println!("{}", text);
    } else {
        println!(
            "{}: {} root, {} nodes, depth {}",
            ast.display(),
            report.root,
            report.nodes,
            report.depth
        );
        for (kind, count) in &report.kinds {
            println!("  {:<18} {}", kind, count);
        }
    }

    if let Some(warning) = unknown_node_warning(&report) {
        if json {
            eprintln!("{}", warning.to_json());
        } else {
            eprint!("{}", warning.to_human_readable());
        }
    }
    Ok(())
}

/// Warning for node tags that load but cannot be evaluated
pub(crate) fn unknown_node_warning(report: &CheckReport) -> Option<Diagnostic> {
    if report.unknown == 0 {
        return None;
    }
    let diagnostic = Diagnostic::warning(runtime::UNKNOWN_NODE)
        .message(format!(
            "{} unknown node(s) will fail evaluation",
            report.unknown
        ))
        .note(Note::new("run `stencil explain E5008` for details"))
        .build();
    Some(diagnostic)
}

pub(crate) fn check_report(program: &crate::ast::Node) -> CheckReport {
    let kinds = program.census();
    CheckReport {
        root: program.kind_name(),
        nodes: kinds.values().sum(),
        depth: program.depth(),
        unknown: kinds.get("Unknown").copied().unwrap_or(0),
        kinds,
    }
}
