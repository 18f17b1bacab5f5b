//! Inspect command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::inspect::{format_inspection, inspect};
use crate::slp::Slp;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Print the header and frame table of a container
pub fn run_inspect(container: &Path, json: bool) -> ExitCode {
    let slp = match Slp::open(container) {
        Ok(slp) => slp,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", container.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let report = inspect(&slp);
    if json {
        match report.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", format_inspection(&report));
    }

    ExitCode::from(EXIT_SUCCESS)
}
