//! Attribute-level task mutations
//!
//! Each function changes one attribute of a single task and reports what
//! happened as a human-readable sentence. A rejected change leaves the task
//! untouched and comes back with `applied == false`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::date::DateParser;
use super::task::{Rank, Task};

/// Sentinel description text that clears the description
pub const CLEAR_DESCRIPTION: &str = "null";

/// Outcome of a single attribute mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    pub applied: bool,
    pub message: String,
}

impl MutationResult {
    fn applied(message: impl Into<String>) -> Self {
        Self {
            applied: true,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            applied: false,
            message: message.into(),
        }
    }
}

/// Target state of a `mark` command
///
/// Overdue and inactive are derived from timing and can never be set here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Done,
    Ongoing,
}

impl Mark {
    pub fn keyword(&self) -> &'static str {
        match self {
            Mark::Done => "done",
            Mark::Ongoing => "ongoing",
        }
    }

    /// The mark that reproduces a task's current done flag
    pub fn of(task: &Task) -> Self {
        if task.done {
            Mark::Done
        } else {
            Mark::Ongoing
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkError {
    /// A derived state such as overdue or inactive
    Derived(String),
    Unknown(String),
}

impl FromStr for Mark {
    type Err = MarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "done" | "complete" | "completed" => Ok(Mark::Done),
            "ongoing" | "undone" | "not" | "notdone" => Ok(Mark::Ongoing),
            "overdue" | "inactive" => Err(MarkError::Derived(s.to_string())),
            _ => Err(MarkError::Unknown(s.to_string())),
        }
    }
}

/// Attribute flags accepted by `modify`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifyFlag {
    Desc,
    Due,
    Start,
    Tag,
    Untag,
    SetTags,
    Rank,
    Mark,
    /// Renaming needs the whole store to check uniqueness and re-key the
    /// task, so it is applied by the dispatcher rather than here.
    Name,
}

impl ModifyFlag {
    pub const ALL: [ModifyFlag; 9] = [
        ModifyFlag::Desc,
        ModifyFlag::Due,
        ModifyFlag::Start,
        ModifyFlag::Tag,
        ModifyFlag::Untag,
        ModifyFlag::SetTags,
        ModifyFlag::Rank,
        ModifyFlag::Mark,
        ModifyFlag::Name,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            ModifyFlag::Desc => "-desc",
            ModifyFlag::Due => "-due",
            ModifyFlag::Start => "-start",
            ModifyFlag::Tag => "-tag",
            ModifyFlag::Untag => "-untag",
            ModifyFlag::SetTags => "-settags",
            ModifyFlag::Rank => "-rank",
            ModifyFlag::Mark => "-mark",
            ModifyFlag::Name => "-name",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }
}

/// Splits `modify` content into (flag, content) pairs
///
/// Content runs greedily up to the next recognized flag. Text before the
/// first flag is dropped, and unrecognized `-words` stay part of the content.
pub fn split_modifications(text: &str) -> Vec<(ModifyFlag, String)> {
    let mut pairs: Vec<(ModifyFlag, Vec<&str>)> = Vec::new();
    for word in text.split_whitespace() {
        match ModifyFlag::from_token(word) {
            Some(flag) => pairs.push((flag, Vec::new())),
            None => {
                if let Some((_, content)) = pairs.last_mut() {
                    content.push(word);
                }
            }
        }
    }
    pairs
        .into_iter()
        .map(|(flag, words)| (flag, words.join(" ")))
        .collect()
}

/// Sets or clears the deadline, keeping start before deadline
pub fn set_deadline(
    task: &mut Task,
    deadline: Option<NaiveDateTime>,
    dates: &dyn DateParser,
) -> MutationResult {
    match deadline {
        None => {
            task.deadline = None;
            MutationResult::applied(format!("Removed the deadline of '{}'.", task.name))
        }
        Some(due) => {
            if let Some(start) = task.start {
                if due <= start {
                    return MutationResult::rejected(format!(
                        "The deadline of '{}' must be after its start time ({}).",
                        task.name,
                        dates.format(start)
                    ));
                }
            }
            task.deadline = Some(due);
            MutationResult::applied(format!(
                "Deadline of '{}' set to {}.",
                task.name,
                dates.format(due)
            ))
        }
    }
}

/// Sets or clears the start time, keeping start before deadline
pub fn set_start_time(
    task: &mut Task,
    start: Option<NaiveDateTime>,
    dates: &dyn DateParser,
) -> MutationResult {
    match start {
        None => {
            task.start = None;
            MutationResult::applied(format!("Removed the start time of '{}'.", task.name))
        }
        Some(start) => {
            if let Some(due) = task.deadline {
                if start >= due {
                    return MutationResult::rejected(format!(
                        "The start time of '{}' must be before its deadline ({}).",
                        task.name,
                        dates.format(due)
                    ));
                }
            }
            task.start = Some(start);
            MutationResult::applied(format!(
                "Start time of '{}' set to {}.",
                task.name,
                dates.format(start)
            ))
        }
    }
}

/// Sets the description verbatim, or clears it on the `null` sentinel
pub fn set_description(task: &mut Task, text: &str) -> MutationResult {
    if text == CLEAR_DESCRIPTION {
        task.description = None;
        return MutationResult::applied(format!("Removed the description of '{}'.", task.name));
    }
    task.description = Some(text.to_string());
    MutationResult::applied(format!("Description of '{}' updated.", task.name))
}

/// Sets the rank from one of the three rank words
pub fn set_rank(task: &mut Task, text: &str) -> MutationResult {
    match text.parse::<Rank>() {
        Ok(rank) => {
            task.rank = rank;
            MutationResult::applied(format!("Rank of '{}' set to {}.", task.name, rank))
        }
        Err(_) => MutationResult::rejected(format!(
            "'{}' is not a rank, '{}' was left unchanged.",
            text.trim(),
            task.name
        )),
    }
}

/// Adds every whitespace-separated tag in `text`
pub fn add_tags(task: &mut Task, text: &str) -> MutationResult {
    let added: Vec<String> = text
        .split_whitespace()
        .filter(|tag| task.tags.insert(tag))
        .map(str::to_uppercase)
        .collect();
    if added.is_empty() {
        MutationResult::applied(format!("No new tags for '{}'.", task.name))
    } else {
        MutationResult::applied(format!("Tagged '{}' with {}.", task.name, added.join(" ")))
    }
}

/// Removes every whitespace-separated tag in `text`
pub fn remove_tags(task: &mut Task, text: &str) -> MutationResult {
    let removed: Vec<String> = text
        .split_whitespace()
        .filter(|tag| task.tags.remove(tag))
        .map(str::to_uppercase)
        .collect();
    if removed.is_empty() {
        MutationResult::applied(format!("No matching tags on '{}'.", task.name))
    } else {
        MutationResult::applied(format!(
            "Removed {} from '{}'.",
            removed.join(" "),
            task.name
        ))
    }
}

/// Replaces the whole tag set
pub fn set_tags(task: &mut Task, text: &str) -> MutationResult {
    task.tags.clear();
    add_tags(task, text);
    if task.tags.is_empty() {
        MutationResult::applied(format!("Cleared the tags of '{}'.", task.name))
    } else {
        MutationResult::applied(format!(
            "Tags of '{}' set to {}.",
            task.name,
            task.tags.joined()
        ))
    }
}

/// Marks a task done or ongoing
pub fn mark(task: &mut Task, mark: Mark) -> MutationResult {
    task.done = matches!(mark, Mark::Done);
    MutationResult::applied(format!("Marked '{}' as {}.", task.name, mark))
}

/// Applies one `modify` pair that only touches the task value
///
/// `-name` is not handled here; it comes back rejected.
pub fn apply_modification(
    task: &mut Task,
    flag: ModifyFlag,
    content: &str,
    dates: &dyn DateParser,
) -> MutationResult {
    match flag {
        ModifyFlag::Desc => set_description(task, content),
        ModifyFlag::Due | ModifyFlag::Start => {
            let value = if super::date::is_clear_word(content) {
                None
            } else {
                match dates.parse(content) {
                    Some(ts) => Some(ts),
                    None => {
                        return MutationResult::rejected(format!(
                            "'{}' is not a date, '{}' was left unchanged.",
                            content, task.name
                        ))
                    }
                }
            };
            if flag == ModifyFlag::Due {
                set_deadline(task, value, dates)
            } else {
                set_start_time(task, value, dates)
            }
        }
        ModifyFlag::Tag => add_tags(task, content),
        ModifyFlag::Untag => remove_tags(task, content),
        ModifyFlag::SetTags => set_tags(task, content),
        ModifyFlag::Rank => set_rank(task, content),
        ModifyFlag::Mark => match content.parse::<Mark>() {
            Ok(target) => mark(task, target),
            Err(_) => MutationResult::rejected(format!(
                "'{}' is not a mark, '{}' was left unchanged.",
                content, task.name
            )),
        },
        ModifyFlag::Name => MutationResult::rejected("Renaming needs the task list."),
    }
}
