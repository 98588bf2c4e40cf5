//! Task domain model
//!
//! A task is identified by its name (unique, compared case-insensitively) and
//! carries optional timing, a free-text description, a sorted tag set, a rank
//! and a done flag. Overdue, inactive and floating are derived on read.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Importance tier of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    #[default]
    Low,
    Medium,
    High,
}

impl Rank {
    /// Returns the lower-case keyword used in commands
    pub fn keyword(&self) -> &'static str {
        match self {
            Rank::Low => "low",
            Rank::Medium => "medium",
            Rank::High => "high",
        }
    }

    /// Returns the upper-case label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            Rank::Low => "LOW",
            Rank::Medium => "MEDIUM",
            Rank::High => "HIGH",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a rank word is not one of the three tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRank(pub String);

impl FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Rank::High),
            "medium" | "med" | "m" => Ok(Rank::Medium),
            "low" | "l" => Ok(Rank::Low),
            _ => Err(UnknownRank(s.to_string())),
        }
    }
}

/// Sorted set of upper-case tags
///
/// Tags are normalized on insert, so `urgent` and `URGENT` are the same tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// Creates an empty tag set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a tag, returning true if it was not already present
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.0.insert(tag.to_uppercase())
    }

    /// Removes a tag, returning true if it was present
    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.remove(&tag.trim().to_uppercase())
    }

    /// Returns true if the tag is present (case-insensitive)
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(&tag.trim().to_uppercase())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over tags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-separated form, as accepted back by `tag` and `-settags`
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl<'a> FromIterator<&'a str> for Tags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// A named task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Display name; the store key is its lower-cased form
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,

    #[serde(default)]
    pub rank: Rank,

    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Creates a floating, not-done, low-rank task
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            start: None,
            deadline: None,
            tags: Tags::new(),
            rank: Rank::Low,
            done: false,
        }
    }

    /// The case-insensitive lookup key for this task
    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    /// Deadline has passed and the task is still open
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        !self.done && self.deadline.is_some_and(|due| due < now)
    }

    /// Start time lies in the future
    pub fn is_inactive_at(&self, now: NaiveDateTime) -> bool {
        self.start.is_some_and(|start| start > now)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(now())
    }

    pub fn is_inactive(&self) -> bool {
        self.is_inactive_at(now())
    }

    /// Neither a start time nor a deadline
    pub fn is_floating(&self) -> bool {
        self.start.is_none() && self.deadline.is_none()
    }

    /// Both a start time and a deadline
    pub fn is_timed(&self) -> bool {
        self.start.is_some() && self.deadline.is_some()
    }
}

/// Normalizes a task name into its store key
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Local wall-clock time, the reference point for derived states
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
