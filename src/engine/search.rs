//! Keyword search and attribute filters
//!
//! Both queries are read-only and return 1-based display indices in store
//! order, never ranked by relevance.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::{DateParser, OrderedTaskStore, Rank, Task};

/// Timing field a date filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    Deadline,
}

/// A filter criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Done,
    Ongoing,
    Rank(Rank),
    Before(TimeField, NaiveDateTime),
    After(TimeField, NaiveDateTime),
    /// Neither start nor deadline
    Floating,
    HasDeadline,
    /// Both start and deadline
    Timed,
    Overdue,
    Inactive,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriterionError {
    Unknown(String),
    Date(String),
}

impl Criterion {
    /// Parses a criterion such as `done`, `high` or `start before friday`
    pub fn parse(text: &str, dates: &dyn DateParser) -> Result<Self, CriterionError> {
        let lowered = text.trim().to_ascii_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();

        let simple = match words.as_slice() {
            ["done"] => Some(Criterion::Done),
            ["ongoing"] | ["undone"] | ["open"] => Some(Criterion::Ongoing),
            ["floating"] | ["notime"] | ["untimed"] => Some(Criterion::Floating),
            ["deadline"] | ["due"] => Some(Criterion::HasDeadline),
            ["timed"] | ["event"] => Some(Criterion::Timed),
            ["overdue"] => Some(Criterion::Overdue),
            ["inactive"] => Some(Criterion::Inactive),
            ["all"] => Some(Criterion::All),
            [rank] | ["rank", rank] => rank.parse::<Rank>().ok().map(Criterion::Rank),
            _ => None,
        };
        if let Some(criterion) = simple {
            return Ok(criterion);
        }

        let (field, rest) = match words.first() {
            Some(&"start") => (TimeField::Start, &words[1..]),
            Some(&"due") | Some(&"deadline") | Some(&"end") => (TimeField::Deadline, &words[1..]),
            _ => (TimeField::Deadline, &words[..]),
        };
        let (is_before, date_words) = match rest.split_first() {
            Some((&"before", tail)) => (true, tail),
            Some((&"after", tail)) => (false, tail),
            _ => return Err(CriterionError::Unknown(text.to_string())),
        };

        let date_text = date_words.join(" ");
        let when = dates
            .parse(&date_text)
            .ok_or_else(|| CriterionError::Date(date_text.clone()))?;
        Ok(if is_before {
            Criterion::Before(field, when)
        } else {
            Criterion::After(field, when)
        })
    }

    /// True if the task satisfies this criterion at `now`
    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        match self {
            Criterion::Done => task.done,
            Criterion::Ongoing => !task.done,
            Criterion::Rank(rank) => task.rank == *rank,
            Criterion::Before(field, when) => field_value(task, *field).is_some_and(|t| t < *when),
            Criterion::After(field, when) => field_value(task, *field).is_some_and(|t| t > *when),
            Criterion::Floating => task.is_floating(),
            Criterion::HasDeadline => task.deadline.is_some(),
            Criterion::Timed => task.is_timed(),
            Criterion::Overdue => task.is_overdue_at(now),
            Criterion::Inactive => task.is_inactive_at(now),
            Criterion::All => true,
        }
    }
}

fn field_value(task: &Task, field: TimeField) -> Option<NaiveDateTime> {
    match field {
        TimeField::Start => task.start,
        TimeField::Deadline => task.deadline,
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field_name = |field: &TimeField| match field {
            TimeField::Start => "start",
            TimeField::Deadline => "deadline",
        };
        match self {
            Criterion::Done => f.write_str("done"),
            Criterion::Ongoing => f.write_str("ongoing"),
            Criterion::Rank(rank) => write!(f, "rank {}", rank),
            Criterion::Before(field, when) => {
                write!(f, "{} before {}", field_name(field), when.format("%Y-%m-%d %H:%M"))
            }
            Criterion::After(field, when) => {
                write!(f, "{} after {}", field_name(field), when.format("%Y-%m-%d %H:%M"))
            }
            Criterion::Floating => f.write_str("no timing"),
            Criterion::HasDeadline => f.write_str("has a deadline"),
            Criterion::Timed => f.write_str("has start and deadline"),
            Criterion::Overdue => f.write_str("overdue"),
            Criterion::Inactive => f.write_str("not yet started"),
            Criterion::All => f.write_str("all"),
        }
    }
}

/// Indices of tasks matching a key phrase
///
/// A task matches when any word equals one of its tags, or when the whole
/// phrase occurs in its name or description (case-insensitive).
pub fn find(store: &OrderedTaskStore, phrase: &str) -> Vec<usize> {
    let phrase = phrase.trim().to_lowercase();
    let keywords: Vec<&str> = phrase.split_whitespace().collect();

    store
        .indexed()
        .filter(|(_, task)| {
            keywords.iter().any(|k| task.tags.contains(k))
                || task.name.to_lowercase().contains(&phrase)
                || task
                    .description
                    .as_ref()
                    .is_some_and(|d| d.to_lowercase().contains(&phrase))
        })
        .map(|(index, _)| index)
        .collect()
}

/// Indices of tasks satisfying a criterion
pub fn filter(store: &OrderedTaskStore, criterion: &Criterion, now: NaiveDateTime) -> Vec<usize> {
    store
        .indexed()
        .filter(|(_, task)| criterion.matches(task, now))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NaturalDates;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample() -> OrderedTaskStore {
        let mut store = OrderedTaskStore::new();

        let mut groceries = Task::new("Buy groceries");
        groceries.description = Some("Milk and eggs from the market".to_string());
        groceries.tags.insert("home");
        store.add(groceries).unwrap();

        let mut report = Task::new("Quarterly report");
        report.deadline = Some(day(10));
        report.rank = Rank::High;
        report.tags.insert("work");
        store.add(report).unwrap();

        let mut meeting = Task::new("Team meeting");
        meeting.start = Some(day(20));
        meeting.deadline = Some(day(21));
        meeting.done = true;
        store.add(meeting).unwrap();

        store.add(Task::new("Call plumber")).unwrap();
        store
    }

    #[test]
    fn find_matches_tags_names_and_descriptions() {
        let store = sample();
        assert_eq!(find(&store, "WORK"), vec![2]);
        assert_eq!(find(&store, "report"), vec![2]);
        assert_eq!(find(&store, "milk and"), vec![1]);
        assert_eq!(find(&store, "home work"), vec![1, 2]);
        assert!(find(&store, "holiday").is_empty());
    }

    #[test]
    fn find_needs_whole_phrase_for_text() {
        let store = sample();
        // "eggs milk" is not a substring of the description, and neither word is a tag
        assert!(find(&store, "eggs milk").is_empty());
    }

    #[test]
    fn filter_by_state_and_rank() {
        let store = sample();
        let now = day(15);
        assert_eq!(filter(&store, &Criterion::Done, now), vec![3]);
        assert_eq!(filter(&store, &Criterion::Ongoing, now), vec![1, 2, 4]);
        assert_eq!(filter(&store, &Criterion::Rank(Rank::High), now), vec![2]);
        assert_eq!(filter(&store, &Criterion::Rank(Rank::Low), now), vec![1, 3, 4]);
    }

    #[test]
    fn filter_by_timing() {
        let store = sample();
        let now = day(15);
        assert_eq!(filter(&store, &Criterion::Floating, now), vec![1, 4]);
        assert_eq!(filter(&store, &Criterion::HasDeadline, now), vec![2, 3]);
        assert_eq!(filter(&store, &Criterion::Timed, now), vec![3]);
        assert_eq!(filter(&store, &Criterion::Overdue, now), vec![2]);
        assert_eq!(filter(&store, &Criterion::Inactive, now), vec![3]);
        assert_eq!(
            filter(&store, &Criterion::Before(TimeField::Deadline, day(15)), now),
            vec![2]
        );
        assert_eq!(
            filter(&store, &Criterion::After(TimeField::Start, day(1)), now),
            vec![3]
        );
        assert_eq!(filter(&store, &Criterion::All, now).len(), 4);
    }

    #[test]
    fn parse_criteria() {
        let dates = NaturalDates::new();
        assert_eq!(Criterion::parse("DONE", &dates), Ok(Criterion::Done));
        assert_eq!(Criterion::parse("high", &dates), Ok(Criterion::Rank(Rank::High)));
        assert_eq!(Criterion::parse("rank low", &dates), Ok(Criterion::Rank(Rank::Low)));
        assert_eq!(
            Criterion::parse("before 2025-01-05", &dates),
            Ok(Criterion::Before(TimeField::Deadline, day(5)))
        );
        assert_eq!(
            Criterion::parse("start after 2025-01-05", &dates),
            Ok(Criterion::After(TimeField::Start, day(5)))
        );
        assert!(matches!(
            Criterion::parse("purple", &dates),
            Err(CriterionError::Unknown(_))
        ));
        assert!(matches!(
            Criterion::parse("due before someday", &dates),
            Err(CriterionError::Date(_))
        ));
    }
}
