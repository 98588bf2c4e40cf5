//! Taskline - a free-text task list interpreter with undo
//!
//! Commands such as `add Buy milk` or `due 1 friday` are parsed, applied to
//! an ordered, name-keyed task list, and recorded as inverse commands so
//! that `undo` can replay them.

pub mod domain;
pub mod engine;
pub mod storage;
pub mod cli;

pub use domain::{OrderedTaskStore, Rank, Task};
pub use engine::{CommandError, Dispatcher, Reply};
