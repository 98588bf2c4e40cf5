//! Output formatting for CLI commands

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{DateParser, Task};
pub use crate::storage::OutputFormat;

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints an error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints a task listing: one line per task, or a JSON array
    pub fn tasks(&self, rows: &[TaskRow]) {
        if self.is_json() {
            self.data(&rows);
            return;
        }
        if rows.is_empty() {
            println!("No tasks.");
            return;
        }
        for row in rows {
            println!("{}", row.line());
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Returns true if using text format
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// One task as shown in a listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskRow {
    pub index: usize,
    pub name: String,
    pub description: Option<String>,
    pub start: Option<String>,
    pub deadline: Option<String>,
    pub tags: Vec<String>,
    pub rank: &'static str,
    pub done: bool,
    pub overdue: bool,
    pub inactive: bool,
}

impl TaskRow {
    pub fn new(index: usize, task: &Task, dates: &dyn DateParser, now: NaiveDateTime) -> Self {
        Self {
            index,
            name: task.name.clone(),
            description: task.description.clone(),
            start: task.start.map(|ts| dates.format(ts)),
            deadline: task.deadline.map(|ts| dates.format(ts)),
            tags: task.tags.iter().map(str::to_string).collect(),
            rank: task.rank.keyword(),
            done: task.done,
            overdue: task.is_overdue_at(now),
            inactive: task.is_inactive_at(now),
        }
    }

    /// Single-line text rendering
    pub fn line(&self) -> String {
        let status = if self.done {
            'x'
        } else if self.overdue {
            '!'
        } else {
            ' '
        };
        let mut line = format!("{:>3}. [{}] {}", self.index, status, self.name);

        if self.rank != "low" {
            line.push_str(&format!(" ({})", self.rank.to_uppercase()));
        }
        if let Some(start) = &self.start {
            line.push_str(&format!(" from {}", start));
        }
        if let Some(deadline) = &self.deadline {
            line.push_str(&format!(" due {}", deadline));
        }
        for tag in &self.tags {
            line.push_str(&format!(" #{}", tag));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NaturalDates, Rank};
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn row_line_shows_rank_dates_and_tags() {
        let mut task = Task::new("Ship release");
        task.rank = Rank::High;
        task.tags.insert("work");
        task.deadline = NaiveDate::from_ymd_opt(2025, 6, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0);

        let row = TaskRow::new(2, &task, &NaturalDates::new(), noon());

        assert_eq!(
            row.line(),
            "  2. [ ] Ship release (HIGH) due 2025-06-03 00:00:00 #WORK"
        );
    }

    #[test]
    fn row_marks_overdue_and_done() {
        let mut late = Task::new("late");
        late.deadline = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0);
        let row = TaskRow::new(1, &late, &NaturalDates::new(), noon());
        assert!(row.overdue);
        assert!(row.line().starts_with("  1. [!]"));

        late.done = true;
        let row = TaskRow::new(1, &late, &NaturalDates::new(), noon());
        assert!(!row.overdue);
        assert!(row.line().starts_with("  1. [x]"));
    }

    #[test]
    fn row_serializes_listing_fields() {
        let row = TaskRow::new(1, &Task::new("a"), &NaturalDates::new(), noon());
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["index"], 1);
        assert_eq!(json["rank"], "low");
        assert_eq!(json["done"], false);
        assert!(json["deadline"].is_null());
        assert!(json["tags"].as_array().unwrap().is_empty());
    }
}
