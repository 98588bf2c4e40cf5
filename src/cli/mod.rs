//! # Command-Line Interface
//!
//! The `taskline` binary: an interactive shell over the interpreter, plus
//! one-shot entry points for scripts.
//!
//! ## Commands
//!
//! | Command | Purpose | Example |
//! |---------|---------|---------|
//! | `shell` (default) | Interactive session, one command per line | `taskline` |
//! | `exec` | Run lines in a single session, save once | `taskline exec "add milk" "rank 1 high"` |
//! | `list` | Print every stored task | `taskline list --format json` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output and debug-level logs:
//! ```bash
//! taskline --verbose exec "add milk"
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod session;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat, TaskRow};
pub use session::Session;
