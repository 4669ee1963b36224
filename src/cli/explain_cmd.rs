//! Handler for the `stencil explain` subcommand.

use std::process::ExitCode;

use crate::diagnostics::error_codes::explain;

pub(crate) fn run_explain(code: &str) -> ExitCode {
    match explain(&code.to_uppercase()) {
        Some(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("Unknown error code: {}", code);
            eprintln!();
            eprintln!("Valid error codes:");
            eprintln!("  E5xxx  Evaluation errors (E5001-E5012)");
            eprintln!("  E6xxx  Input loading errors (E6001-E6004)");
            ExitCode::FAILURE
        }
    }
}
