//! Parsed command model
//!
//! Every input line becomes one [`Command`]. Arguments are already validated
//! and typed by the time a command exists.

use std::fmt;

use chrono::NaiveDateTime;

use super::search::Criterion;
use super::sort::{SortKey, SortOrder};
use crate::domain::{Mark, ModifyFlag, Rank};

/// Leading keyword of a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Add,
    Delete,
    Describe,
    Due,
    Start,
    View,
    Rank,
    Modify,
    Rename,
    Mark,
    Tag,
    Untag,
    Search,
    Sort,
    Unsort,
    Filter,
    ClearSearch,
    Clear,
    Undo,
    Recover,
    Dismiss,
    First,
    Prev,
    Next,
    Last,
    Page,
    Help,
    Exit,
}

/// Argument layout expected after a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Nothing required; trailing words are ignored
    Bare,
    /// A 1-based task index
    Index,
    /// A positive count or page number, not bounded by the task count
    Count,
    /// Free text
    Text,
    /// A task index followed by free text
    IndexText,
    /// A task index followed by a date (or `null`)
    IndexDate,
}

impl Keyword {
    /// Resolves a (case-insensitive) command word, including aliases
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_lowercase().as_str() {
            "add" => Keyword::Add,
            "delete" | "del" => Keyword::Delete,
            "desc" | "describe" => Keyword::Describe,
            "due" | "end" => Keyword::Due,
            "start" => Keyword::Start,
            "view" => Keyword::View,
            "rank" => Keyword::Rank,
            "modify" | "mod" => Keyword::Modify,
            "name" | "rename" => Keyword::Rename,
            "mark" => Keyword::Mark,
            "tag" => Keyword::Tag,
            "untag" => Keyword::Untag,
            "search" | "find" => Keyword::Search,
            "sort" => Keyword::Sort,
            "unsort" => Keyword::Unsort,
            "filter" => Keyword::Filter,
            "clrsrc" => Keyword::ClearSearch,
            "clear" | "clr" => Keyword::Clear,
            "undo" => Keyword::Undo,
            "recover" => Keyword::Recover,
            "dismiss" => Keyword::Dismiss,
            "first" => Keyword::First,
            "prev" => Keyword::Prev,
            "next" => Keyword::Next,
            "last" => Keyword::Last,
            "page" => Keyword::Page,
            "help" => Keyword::Help,
            "exit" | "quit" => Keyword::Exit,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn shape(&self) -> Shape {
        match self {
            Keyword::Unsort
            | Keyword::ClearSearch
            | Keyword::Clear
            | Keyword::Undo
            | Keyword::First
            | Keyword::Prev
            | Keyword::Next
            | Keyword::Last
            | Keyword::Help
            | Keyword::Exit => Shape::Bare,
            Keyword::Delete | Keyword::View | Keyword::Dismiss => Shape::Index,
            Keyword::Recover | Keyword::Page => Shape::Count,
            Keyword::Add | Keyword::Search | Keyword::Sort | Keyword::Filter => Shape::Text,
            Keyword::Describe
            | Keyword::Rank
            | Keyword::Modify
            | Keyword::Rename
            | Keyword::Mark
            | Keyword::Tag
            | Keyword::Untag => Shape::IndexText,
            Keyword::Due | Keyword::Start => Shape::IndexDate,
        }
    }

    /// Machine-only commands, issued by undo replay and never typed by users
    pub fn is_restricted(&self) -> bool {
        matches!(self, Keyword::Unsort | Keyword::Recover | Keyword::Dismiss)
    }
}

/// Direction for the paging commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    First,
    Prev,
    Next,
    Last,
    /// 1-based page number
    To(usize),
}

/// A parsed, validated command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { name: String },
    Delete { index: usize },
    Describe { index: usize, text: String },
    SetDue { index: usize, when: Option<NaiveDateTime> },
    SetStart { index: usize, when: Option<NaiveDateTime> },
    View { index: usize },
    Rank { index: usize, rank: Rank },
    Modify { index: usize, changes: Vec<(ModifyFlag, String)> },
    Rename { index: usize, name: String },
    Mark { index: usize, mark: Mark },
    Tag { index: usize, tags: String },
    Untag { index: usize, tags: String },
    Search { phrase: String },
    Sort { key: SortKey, order: SortOrder },
    Unsort,
    Filter { criterion: Criterion },
    ClearSearch,
    Clear,
    Undo,
    Recover { count: usize },
    Dismiss { index: usize },
    Page(PageMove),
    Help,
    Exit,
}

impl Command {
    /// The 1-based task index this command addresses, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            Command::Delete { index }
            | Command::Describe { index, .. }
            | Command::SetDue { index, .. }
            | Command::SetStart { index, .. }
            | Command::View { index }
            | Command::Rank { index, .. }
            | Command::Modify { index, .. }
            | Command::Rename { index, .. }
            | Command::Mark { index, .. }
            | Command::Tag { index, .. }
            | Command::Untag { index, .. }
            | Command::Dismiss { index } => Some(*index),
            _ => None,
        }
    }

    /// True for commands that change the task list
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Command::View { .. }
                | Command::Search { .. }
                | Command::Filter { .. }
                | Command::ClearSearch
                | Command::Page(_)
                | Command::Help
                | Command::Exit
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Keyword::Add => "add",
            Keyword::Delete => "delete",
            Keyword::Describe => "desc",
            Keyword::Due => "due",
            Keyword::Start => "start",
            Keyword::View => "view",
            Keyword::Rank => "rank",
            Keyword::Modify => "modify",
            Keyword::Rename => "name",
            Keyword::Mark => "mark",
            Keyword::Tag => "tag",
            Keyword::Untag => "untag",
            Keyword::Search => "search",
            Keyword::Sort => "sort",
            Keyword::Unsort => "unsort",
            Keyword::Filter => "filter",
            Keyword::ClearSearch => "clrsrc",
            Keyword::Clear => "clear",
            Keyword::Undo => "undo",
            Keyword::Recover => "recover",
            Keyword::Dismiss => "dismiss",
            Keyword::First => "first",
            Keyword::Prev => "prev",
            Keyword::Next => "next",
            Keyword::Last => "last",
            Keyword::Page => "page",
            Keyword::Help => "help",
            Keyword::Exit => "exit",
        };
        f.write_str(word)
    }
}

/// Reference text returned by `help`
pub const HELP: &str = "\
Commands (<idx> is the number shown next to a task):
  add <name>                      create a task
  delete <idx>                    delete a task (alias: del)
  desc <idx> <text>               set the description ('null' clears it)
  due <idx> <date>                set the deadline ('null' clears it; alias: end)
  start <idx> <date>              set the start time ('null' clears it)
  rank <idx> <high|medium|low>    set the rank
  mark <idx> <done|ongoing>       mark a task done or not done
  tag <idx> <tag...>              add tags
  untag <idx> <tag...>            remove tags
  name <idx> <name>               rename a task
  modify <idx> -flag content...   change several attributes at once
                                  flags: -desc -due -start -tag -untag -settags -rank -mark -name
  view <idx>                      show every detail of a task
  search <text>                   show tasks matching text or tags (alias: find)
  filter <criterion>              done, ongoing, high, medium, low, overdue, inactive,
                                  floating, deadline, timed, all,
                                  [start|due] before|after <date>
  clrsrc                          show all tasks again
  sort <key> [asc|desc]           name, start, due, time, importance, rank
  clear                           delete every task (alias: clr)
  undo                            undo the last change
  first | prev | next | last      move between pages
  page <n>                        jump to a page
  help                            show this text
  exit                            leave

Dates: 2025-01-31, 2025-01-31 14:00, 31/01/2025, today, tomorrow, +3d, in 2 weeks, friday";
