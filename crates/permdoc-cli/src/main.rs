//! permdoc - explain why a file, directory or command is not accessible.

use std::process::ExitCode;

use colored::Colorize;
use permdoc_core::{PermdocError, EXIT_USAGE};

fn main() -> ExitCode {
    match permdoc_cli::run() {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            if let Some(PermdocError::EmptyTarget) = err.downcast_ref::<PermdocError>() {
                eprintln!("usage: permdoc check <TARGET>");
            }
            // Anything that keeps a report from being produced.
            ExitCode::from(u8::try_from(EXIT_USAGE).unwrap_or(2))
        }
    }
}
