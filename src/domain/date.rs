//! Date parsing capability
//!
//! The interpreter treats date parsing as an opaque capability behind the
//! [`DateParser`] trait. `format` and `parse` must be exact inverses, since
//! undo replays timing changes as text.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use super::task::now;

/// Canonical timestamp format produced by [`DateParser::format`]
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Words that mean "no value" in a date position
const CLEAR_WORDS: &[&str] = &["null", "none"];

/// Parses and formats user-supplied dates
pub trait DateParser {
    /// Parses free text into a timestamp
    fn parse(&self, text: &str) -> Option<NaiveDateTime>;

    /// Formats a timestamp so that `parse` returns it unchanged
    fn format(&self, timestamp: NaiveDateTime) -> String;

    fn is_parseable(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }
}

/// Returns true if `text` is the sentinel for clearing a timing field
pub fn is_clear_word(text: &str) -> bool {
    let text = text.trim();
    CLEAR_WORDS.iter().any(|w| text.eq_ignore_ascii_case(w))
}

/// Default date parser: absolute dates plus a small relative vocabulary
///
/// Relative words are resolved against a reference clock, which tests pin.
#[derive(Debug, Clone, Default)]
pub struct NaturalDates {
    reference: Option<NaiveDateTime>,
}

impl NaturalDates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative words against a fixed instant instead of the clock
    pub fn with_reference(reference: NaiveDateTime) -> Self {
        Self {
            reference: Some(reference),
        }
    }

    fn today(&self) -> NaiveDate {
        self.reference.unwrap_or_else(now).date()
    }

    fn parse_absolute(text: &str) -> Option<NaiveDateTime> {
        const DATETIME_FORMATS: &[&str] = &[
            CANONICAL_FORMAT,
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%d/%m/%Y %H:%M",
        ];
        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

        for fmt in DATETIME_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(ts);
            }
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .map(midnight)
    }

    fn parse_relative(&self, text: &str) -> Option<NaiveDateTime> {
        let today = self.today();
        match text {
            "now" => return Some(self.reference.unwrap_or_else(now)),
            "today" => return Some(midnight(today)),
            "tomorrow" => return shift(today, 1).map(midnight),
            "yesterday" => return shift(today, -1).map(midnight),
            _ => {}
        }

        if let Some(offset) = text.strip_prefix('+') {
            return offset_days(offset).and_then(|days| shift(today, days)).map(midnight);
        }

        if let Some(rest) = text.strip_prefix("in ") {
            let mut parts = rest.split_whitespace();
            let amount: i64 = parts.next()?.parse().ok()?;
            let per_unit = match parts.next()? {
                "day" | "days" => 1,
                "week" | "weeks" => 7,
                _ => return None,
            };
            if parts.next().is_some() {
                return None;
            }
            return amount
                .checked_mul(per_unit)
                .and_then(|days| shift(today, days))
                .map(midnight);
        }

        let weekday = text.strip_prefix("next ").unwrap_or(text);
        weekday
            .parse::<Weekday>()
            .ok()
            .map(|target| midnight(next_weekday(today, target)))
    }
}

impl DateParser for NaturalDates {
    fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Self::parse_absolute(text).or_else(|| self.parse_relative(&text.to_ascii_lowercase()))
    }

    fn format(&self, timestamp: NaiveDateTime) -> String {
        timestamp.format(CANONICAL_FORMAT).to_string()
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// `3d` → 3, `2w` → 14
fn offset_days(offset: &str) -> Option<i64> {
    if let Some(days) = offset.strip_suffix('d') {
        return days.parse().ok();
    }
    if let Some(weeks) = offset.strip_suffix('w') {
        return weeks.parse::<i64>().ok()?.checked_mul(7);
    }
    None
}

/// `from` moved by `days`, or `None` past the representable range
fn shift(from: NaiveDate, days: i64) -> Option<NaiveDate> {
    from.checked_add_signed(Duration::try_days(days)?)
}

/// Next occurrence of `target` strictly after `from`
fn next_weekday(from: NaiveDate, target: Weekday) -> NaiveDate {
    let current = from.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut delta = (wanted - current).rem_euclid(7);
    if delta == 0 {
        delta = 7;
    }
    from + Duration::days(delta)
}
