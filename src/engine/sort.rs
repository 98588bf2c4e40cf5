//! Task ordering
//!
//! Sorting computes a new permutation of the display order and writes it back
//! into the store. Sorts are stable, so re-applying the same key keeps the
//! order unchanged.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::domain::{OrderedTaskStore, Task};

/// What to sort by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Alphabetical,
    Start,
    Deadline,
    /// Start time when present, otherwise deadline
    Time,
    /// Done state, overdue state, rank, deadline, start, name
    Importance,
    Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Alphabetical => "name",
            SortKey::Start => "start time",
            SortKey::Deadline => "deadline",
            SortKey::Time => "time",
            SortKey::Importance => "importance",
            SortKey::Rank => "rank",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" | "alpha" | "alphabetical" => Ok(SortKey::Alphabetical),
            "start" => Ok(SortKey::Start),
            "due" | "deadline" | "end" => Ok(SortKey::Deadline),
            "time" => Ok(SortKey::Time),
            "importance" | "important" | "priority" => Ok(SortKey::Importance),
            "rank" => Ok(SortKey::Rank),
            _ => Err(()),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("ascending"),
            SortOrder::Descending => f.write_str("descending"),
        }
    }
}

/// Present values first, in ascending order; absent values last
fn nulls_last(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_name(a: &Task, b: &Task) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

fn by_importance(a: &Task, b: &Task, now: NaiveDateTime) -> Ordering {
    // open tasks first
    a.done
        .cmp(&b.done)
        .then_with(|| {
            if a.done || b.done {
                return Ordering::Equal;
            }
            b.is_overdue_at(now).cmp(&a.is_overdue_at(now))
        })
        .then_with(|| b.rank.cmp(&a.rank))
        .then_with(|| nulls_last(a.deadline, b.deadline))
        .then_with(|| nulls_last(a.start, b.start))
        .then_with(|| by_name(a, b))
}

/// Ascending comparison of two tasks under `key`
pub fn compare(key: SortKey, a: &Task, b: &Task, now: NaiveDateTime) -> Ordering {
    match key {
        SortKey::Alphabetical => by_name(a, b),
        SortKey::Start => nulls_last(a.start, b.start),
        SortKey::Deadline => nulls_last(a.deadline, b.deadline),
        SortKey::Time => nulls_last(a.start.or(a.deadline), b.start.or(b.deadline)),
        SortKey::Importance => by_importance(a, b, now),
        // highest rank first, like importance
        SortKey::Rank => b.rank.cmp(&a.rank),
    }
}

/// Task names in the order `key`/`order` would put them
///
/// Descending reverses the whole comparator rather than each level of it.
pub fn sorted_names(
    store: &OrderedTaskStore,
    key: SortKey,
    order: SortOrder,
    now: NaiveDateTime,
) -> Vec<String> {
    let mut tasks: Vec<&Task> = store.iter().collect();
    tasks.sort_by(|a, b| {
        let ordering = compare(key, a, b, now);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    tasks.into_iter().map(|t| t.name.clone()).collect()
}

/// Sorts the store in place and returns a summary
pub fn sort(
    store: &mut OrderedTaskStore,
    key: SortKey,
    order: SortOrder,
    now: NaiveDateTime,
) -> String {
    let names = sorted_names(store, key, order, now);
    store.set_order(&names);
    format!("Sort by {} {}.", key.label(), order)
}
