//! # Command Interpreter
//!
//! Free-text commands in, human-readable replies out.
//!
//! ## Flow
//!
//! | Step | Module | Role |
//! |------|--------|------|
//! | 1 | [`parser`] | classify the keyword, validate arguments, build a [`Command`] |
//! | 2 | [`dispatcher`] | run the command against the store |
//! | 3 | [`search`], [`sort`] | read-only queries and reordering |
//! | 4 | [`undo`] | record the inverse command, replay it on `undo` |
//!
//! ## Undo
//!
//! Undo replays text. Each change records a command line that reverses it
//! (`rank 2 low`, `dismiss 5`, `recover 3`, `unsort`), and `undo` feeds that
//! line back through the parser with machine-only commands allowed.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod parser;
pub mod search;
pub mod sort;
pub mod undo;

pub use command::{Command, Keyword, PageMove};
pub use dispatcher::{Dispatcher, Query, Reply, DEFAULT_PAGE_SIZE};
pub use error::{CommandError, ErrorKind};
pub use parser::{CommandParser, ParseError};
pub use search::{Criterion, TimeField};
pub use sort::{SortKey, SortOrder};
pub use undo::UndoEngine;
