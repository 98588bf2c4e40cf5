//! # Storage Layer
//!
//! Persistence for the task list and user configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line, display order) | `<data-dir>/tasks.jsonl` or `--file` |
//! | Config | TOML | `<config-dir>/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskFile`] uses file locking (`fs2`) for concurrent access
//! - All writes are atomic (temp file + rename)

mod jsonl;
mod config;

pub use jsonl::TaskFile;
pub use config::{Config, ConfigError, OutputFormat};
