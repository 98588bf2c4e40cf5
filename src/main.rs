//! Taskline - a task list driven by free-text commands

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskline_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
