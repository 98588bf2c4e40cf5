//! Undo through inverse commands
//!
//! Every change records the text of a command that reverses it. Undo pops
//! that text and replays it through the parser with machine-only commands
//! allowed. Deleted tasks cannot be rebuilt from a name, so their full values
//! go onto a separate dump stack and the inverse text is `recover N`. Sorting
//! stashes the previous order the same way and records `unsort`.

use chrono::NaiveDateTime;

use crate::domain::mutator::CLEAR_DESCRIPTION;
use crate::domain::{DateParser, Mark, ModifyFlag, Rank, Tags, Task};

/// A removed task and the 0-based position it occupied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpedTask {
    pub position: usize,
    pub task: Task,
}

/// LIFO stacks of inverse commands and the payloads they refer to
#[derive(Debug, Default)]
pub struct UndoEngine {
    commands: Vec<String>,
    dumped: Vec<DumpedTask>,
    orders: Vec<Vec<String>>,
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a textual inverse
    pub fn record(&mut self, inverse: impl Into<String>) {
        self.commands.push(inverse.into());
    }

    /// Records removed tasks, undone by `recover N`
    ///
    /// Tasks must be given in the order they were removed.
    pub fn record_removal(&mut self, removed: Vec<DumpedTask>) {
        let count = removed.len();
        self.dumped.extend(removed);
        self.record(format!("recover {}", count));
    }

    /// Records the display order before a sort, undone by `unsort`
    pub fn record_reorder(&mut self, previous: Vec<String>) {
        self.orders.push(previous);
        self.record("unsort");
    }

    /// Pops the most recent inverse command
    pub fn pop(&mut self) -> Option<String> {
        self.commands.pop()
    }

    /// Takes the last `count` dumped tasks, sorted by position
    ///
    /// Returns `None` and leaves the stack alone if fewer are available.
    pub fn take_dumped(&mut self, count: usize) -> Option<Vec<DumpedTask>> {
        if count > self.dumped.len() {
            return None;
        }
        let mut tasks = self.dumped.split_off(self.dumped.len() - count);
        tasks.sort_by_key(|d| d.position);
        Some(tasks)
    }

    /// Takes the most recently stashed display order
    pub fn take_order(&mut self) -> Option<Vec<String>> {
        self.orders.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of pending inverse commands
    pub fn depth(&self) -> usize {
        self.commands.len()
    }

    /// Pending inverse commands, most recent last
    pub fn pending(&self) -> &[String] {
        &self.commands
    }
}

/// Inverse of `add`: the new task sits at `index`
pub fn for_add(index: usize) -> String {
    format!("dismiss {}", index)
}

pub fn for_rename(index: usize, old_name: &str) -> String {
    format!("name {} {}", index, old_name)
}

pub fn for_description(index: usize, old: Option<&str>) -> String {
    match old {
        None => format!("desc {} {}", index, CLEAR_DESCRIPTION),
        // `desc` needs text; `-desc` with nothing after it sets an empty one
        Some("") => format!("modify {} {}", index, ModifyFlag::Desc.token()),
        Some(text) => format!("desc {} {}", index, text),
    }
}

pub fn for_deadline(index: usize, old: Option<NaiveDateTime>, dates: &dyn DateParser) -> String {
    format!("due {} {}", index, date_text(old, dates))
}

pub fn for_start(index: usize, old: Option<NaiveDateTime>, dates: &dyn DateParser) -> String {
    format!("start {} {}", index, date_text(old, dates))
}

pub fn for_rank(index: usize, old: Rank) -> String {
    format!("rank {} {}", index, old.keyword())
}

pub fn for_mark(index: usize, old: Mark) -> String {
    format!("mark {} {}", index, old.keyword())
}

/// Inverse of any tag change: put the whole old tag set back
pub fn for_tags(index: usize, old: &Tags) -> String {
    let inverse = format!("modify {} {}", index, ModifyFlag::SetTags.token());
    if old.is_empty() {
        inverse
    } else {
        format!("{} {}", inverse, old.joined())
    }
}

/// Inverse of one attribute change made by `modify`, given the task before it
pub fn for_modification(
    flag: ModifyFlag,
    index: usize,
    before: &Task,
    dates: &dyn DateParser,
) -> String {
    match flag {
        ModifyFlag::Desc => for_description(index, before.description.as_deref()),
        ModifyFlag::Due => for_deadline(index, before.deadline, dates),
        ModifyFlag::Start => for_start(index, before.start, dates),
        ModifyFlag::Tag | ModifyFlag::Untag | ModifyFlag::SetTags => for_tags(index, &before.tags),
        ModifyFlag::Rank => for_rank(index, before.rank),
        ModifyFlag::Mark => for_mark(index, Mark::of(before)),
        ModifyFlag::Name => for_rename(index, &before.name),
    }
}

fn date_text(value: Option<NaiveDateTime>, dates: &dyn DateParser) -> String {
    match value {
        Some(ts) => dates.format(ts),
        None => "null".to_string(),
    }
}
