//! Domain models for the task interpreter
//!
//! Contains the task model, the ordered store and attribute mutations,
//! without any I/O concerns.

mod task;
mod store;
pub mod date;
pub mod mutator;

pub use task::{name_key, now, Rank, Tags, Task, UnknownRank};
pub use store::{OrderedTaskStore, StoreError};
pub use date::{DateParser, NaturalDates};
pub use mutator::{Mark, ModifyFlag, MutationResult};
