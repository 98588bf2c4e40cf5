//! Command line parser
//!
//! Turns one line of text into a [`Command`]. The leading keyword decides the
//! argument [`Shape`]; each shape validates its parts in the same order:
//! presence, index syntax, index range, then the content vocabulary.

use thiserror::Error;
use tracing::debug;

use super::command::{Command, Keyword, PageMove, Shape};
use super::search::{Criterion, CriterionError};
use super::sort::{SortKey, SortOrder};
use crate::domain::date::is_clear_word;
use crate::domain::mutator::split_modifications;
use crate::domain::{DateParser, Mark, Rank};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Please enter a command!")]
    EmptyInput,

    #[error("'{0}' is not a command I know! Type 'help' to see the list of commands.")]
    UnknownCommand(String),

    #[error("Please provide all the details this command needs!")]
    IncompleteInput,

    #[error("Please provide the index or page number!")]
    IncompleteIndex,

    #[error("The index you entered is not a number!")]
    InvalidIndex,

    #[error("The index you entered is out of range!")]
    IndexOutOfBounds,

    #[error("The rank must be high, medium or low!")]
    InvalidRank,

    #[error("A task can only be marked done or ongoing!")]
    InvalidMark,

    #[error("Unknown filter! Try done, ongoing, high, overdue, floating or before <date>.")]
    InvalidFilter,

    #[error("Sort by name, start, due, time, importance or rank, followed by asc or desc!")]
    InvalidSort,

    #[error("The date you entered could not be understood!")]
    DateNotParseable,
}

/// Parser for the command grammar
pub struct CommandParser {
    dates: Box<dyn DateParser>,
}

impl CommandParser {
    pub fn new(dates: Box<dyn DateParser>) -> Self {
        Self { dates }
    }

    /// The date capability used for date arguments
    pub fn dates(&self) -> &dyn DateParser {
        self.dates.as_ref()
    }

    /// Parses `line`, validating task indices against `task_count`
    pub fn parse(&self, line: &str, task_count: usize) -> Result<Command, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let (word, rest) = split_word(line);
        let keyword =
            Keyword::from_word(word).ok_or_else(|| ParseError::UnknownCommand(word.to_string()))?;
        debug!(%keyword, shape = ?keyword.shape(), "parsing command");

        match keyword.shape() {
            Shape::Bare => Ok(bare(keyword)),
            Shape::Index => {
                let index = parse_index(rest, task_count, ParseError::IncompleteIndex)?;
                Ok(match keyword {
                    Keyword::Delete => Command::Delete { index },
                    Keyword::View => Command::View { index },
                    _ => Command::Dismiss { index },
                })
            }
            Shape::Count => {
                let count = parse_count(rest)?;
                Ok(match keyword {
                    Keyword::Recover => Command::Recover { count },
                    _ => Command::Page(PageMove::To(count)),
                })
            }
            Shape::Text => {
                if rest.is_empty() {
                    return Err(ParseError::IncompleteInput);
                }
                self.text_command(keyword, rest)
            }
            Shape::IndexText => {
                let (index_word, text) = split_word(rest);
                if index_word.is_empty() || text.is_empty() {
                    return Err(ParseError::IncompleteInput);
                }
                let index = parse_index(index_word, task_count, ParseError::IncompleteInput)?;
                index_text_command(keyword, index, text)
            }
            Shape::IndexDate => {
                let (index_word, text) = split_word(rest);
                if index_word.is_empty() || text.is_empty() {
                    return Err(ParseError::IncompleteInput);
                }
                let index = parse_index(index_word, task_count, ParseError::IncompleteInput)?;
                let when = if is_clear_word(text) {
                    None
                } else {
                    Some(self.dates.parse(text).ok_or(ParseError::DateNotParseable)?)
                };
                Ok(match keyword {
                    Keyword::Due => Command::SetDue { index, when },
                    _ => Command::SetStart { index, when },
                })
            }
        }
    }

    fn text_command(&self, keyword: Keyword, text: &str) -> Result<Command, ParseError> {
        match keyword {
            Keyword::Add => Ok(Command::Add {
                name: text.to_string(),
            }),
            Keyword::Search => Ok(Command::Search {
                phrase: text.to_string(),
            }),
            Keyword::Filter => match Criterion::parse(text, self.dates()) {
                Ok(criterion) => Ok(Command::Filter { criterion }),
                Err(CriterionError::Date(_)) => Err(ParseError::DateNotParseable),
                Err(CriterionError::Unknown(_)) => Err(ParseError::InvalidFilter),
            },
            _ => parse_sort(text),
        }
    }
}

fn bare(keyword: Keyword) -> Command {
    match keyword {
        Keyword::Unsort => Command::Unsort,
        Keyword::ClearSearch => Command::ClearSearch,
        Keyword::Clear => Command::Clear,
        Keyword::Undo => Command::Undo,
        Keyword::First => Command::Page(PageMove::First),
        Keyword::Prev => Command::Page(PageMove::Prev),
        Keyword::Next => Command::Page(PageMove::Next),
        Keyword::Last => Command::Page(PageMove::Last),
        Keyword::Help => Command::Help,
        _ => Command::Exit,
    }
}

fn index_text_command(keyword: Keyword, index: usize, text: &str) -> Result<Command, ParseError> {
    let command = match keyword {
        Keyword::Describe => Command::Describe {
            index,
            text: text.to_string(),
        },
        Keyword::Rank => Command::Rank {
            index,
            rank: text.parse::<Rank>().map_err(|_| ParseError::InvalidRank)?,
        },
        Keyword::Mark => Command::Mark {
            index,
            mark: text.parse::<Mark>().map_err(|_| ParseError::InvalidMark)?,
        },
        Keyword::Tag => Command::Tag {
            index,
            tags: text.to_string(),
        },
        Keyword::Untag => Command::Untag {
            index,
            tags: text.to_string(),
        },
        Keyword::Rename => Command::Rename {
            index,
            name: text.to_string(),
        },
        _ => {
            let changes = split_modifications(text);
            if changes.is_empty() {
                return Err(ParseError::IncompleteInput);
            }
            Command::Modify { index, changes }
        }
    };
    Ok(command)
}

fn parse_sort(text: &str) -> Result<Command, ParseError> {
    let mut words = text.split_whitespace();
    let key = words
        .next()
        .and_then(|w| w.parse::<SortKey>().ok())
        .ok_or(ParseError::InvalidSort)?;
    let order = match words.next() {
        Some(word) => word.parse::<SortOrder>().map_err(|_| ParseError::InvalidSort)?,
        None => SortOrder::Ascending,
    };
    if words.next().is_some() {
        return Err(ParseError::InvalidSort);
    }
    Ok(Command::Sort { key, order })
}

/// Parses a 1-based index bounded by `task_count`
fn parse_index(word: &str, task_count: usize, missing: ParseError) -> Result<usize, ParseError> {
    let word = word.split_whitespace().next().ok_or(missing)?;
    let value = parse_number(word)?;
    if value < 1 || value as u64 > task_count as u64 {
        return Err(ParseError::IndexOutOfBounds);
    }
    Ok(value as usize)
}

/// Parses an integer; a well-formed number too large for `i64` is out of range
fn parse_number(word: &str) -> Result<i64, ParseError> {
    word.parse().map_err(|_| {
        let digits = word.strip_prefix(['+', '-']).unwrap_or(word);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            ParseError::IndexOutOfBounds
        } else {
            ParseError::InvalidIndex
        }
    })
}

/// Parses a positive number with no upper bound
fn parse_count(text: &str) -> Result<usize, ParseError> {
    let word = text
        .split_whitespace()
        .next()
        .ok_or(ParseError::IncompleteIndex)?;
    let value = parse_number(word)?;
    if value < 1 {
        return Err(ParseError::IndexOutOfBounds);
    }
    Ok(value as usize)
}

/// Splits off the first whitespace-delimited word; the rest is trimmed
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim()),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModifyFlag, NaturalDates};
    use crate::engine::search::TimeField;
    use chrono::NaiveDate;

    fn parser() -> CommandParser {
        CommandParser::new(Box::new(NaturalDates::new()))
    }

    #[test]
    fn empty_and_unknown() {
        let p = parser();
        assert_eq!(p.parse("   ", 3), Err(ParseError::EmptyInput));
        assert_eq!(
            p.parse("fly away", 3),
            Err(ParseError::UnknownCommand("fly".to_string()))
        );
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let p = parser();
        assert_eq!(
            p.parse("ADD Buy milk", 0),
            Ok(Command::Add {
                name: "Buy milk".to_string()
            })
        );
        assert_eq!(p.parse("Undo", 0), Ok(Command::Undo));
    }

    #[test]
    fn index_bounds() {
        let p = parser();
        assert_eq!(p.parse("delete 0", 3), Err(ParseError::IndexOutOfBounds));
        assert_eq!(p.parse("delete 4", 3), Err(ParseError::IndexOutOfBounds));
        assert_eq!(p.parse("delete -1", 3), Err(ParseError::IndexOutOfBounds));
        assert_eq!(p.parse("delete 1", 3), Ok(Command::Delete { index: 1 }));
        assert_eq!(p.parse("del 3", 3), Ok(Command::Delete { index: 3 }));
    }

    #[test]
    fn oversized_numbers_are_out_of_range() {
        let p = parser();
        assert_eq!(
            p.parse("delete 99999999999999999999", 3),
            Err(ParseError::IndexOutOfBounds)
        );
        assert_eq!(
            p.parse("rank -99999999999999999999 high", 3),
            Err(ParseError::IndexOutOfBounds)
        );
        assert_eq!(
            p.parse("page 99999999999999999999", 3),
            Err(ParseError::IndexOutOfBounds)
        );
        assert_eq!(p.parse("delete 12x", 3), Err(ParseError::InvalidIndex));
        assert_eq!(p.parse("delete -", 3), Err(ParseError::InvalidIndex));
    }

    #[test]
    fn index_shape_errors() {
        let p = parser();
        assert_eq!(p.parse("delete", 3), Err(ParseError::IncompleteIndex));
        assert_eq!(p.parse("view two", 3), Err(ParseError::InvalidIndex));
        assert_eq!(p.parse("page", 3), Err(ParseError::IncompleteIndex));
        assert_eq!(p.parse("page 0", 3), Err(ParseError::IndexOutOfBounds));
        assert_eq!(p.parse("page 12", 3), Ok(Command::Page(PageMove::To(12))));
    }

    #[test]
    fn index_text_shape_errors() {
        let p = parser();
        assert_eq!(p.parse("desc", 3), Err(ParseError::IncompleteInput));
        assert_eq!(p.parse("desc 1", 3), Err(ParseError::IncompleteInput));
        assert_eq!(p.parse("desc x hello", 3), Err(ParseError::InvalidIndex));
        assert_eq!(p.parse("desc 9 hello", 3), Err(ParseError::IndexOutOfBounds));
        assert_eq!(
            p.parse("describe 2 pick up  the kids", 3),
            Ok(Command::Describe {
                index: 2,
                text: "pick up  the kids".to_string()
            })
        );
    }

    #[test]
    fn closed_vocabularies() {
        let p = parser();
        assert_eq!(p.parse("rank 1 urgent", 2), Err(ParseError::InvalidRank));
        assert_eq!(
            p.parse("rank 1 HIGH", 2),
            Ok(Command::Rank {
                index: 1,
                rank: Rank::High
            })
        );
        assert_eq!(p.parse("mark 1 overdue", 2), Err(ParseError::InvalidMark));
        assert_eq!(p.parse("mark 1 inactive", 2), Err(ParseError::InvalidMark));
        assert_eq!(
            p.parse("mark 2 done", 2),
            Ok(Command::Mark {
                index: 2,
                mark: Mark::Done
            })
        );
        assert_eq!(p.parse("sort colour", 2), Err(ParseError::InvalidSort));
        assert_eq!(p.parse("sort name sideways", 2), Err(ParseError::InvalidSort));
        assert_eq!(
            p.parse("sort importance desc", 2),
            Ok(Command::Sort {
                key: SortKey::Importance,
                order: SortOrder::Descending
            })
        );
        assert_eq!(
            p.parse("sort due", 2),
            Ok(Command::Sort {
                key: SortKey::Deadline,
                order: SortOrder::Ascending
            })
        );
        assert_eq!(p.parse("filter purple", 2), Err(ParseError::InvalidFilter));
        assert_eq!(
            p.parse("filter before whenever", 2),
            Err(ParseError::DateNotParseable)
        );
        assert_eq!(
            p.parse("filter start before 2025-01-01", 2),
            Ok(Command::Filter {
                criterion: Criterion::Before(
                    TimeField::Start,
                    NaiveDate::from_ymd_opt(2025, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                )
            })
        );
    }

    #[test]
    fn dates_and_clearing() {
        let p = parser();
        assert_eq!(p.parse("due 1 someday", 1), Err(ParseError::DateNotParseable));
        assert_eq!(
            p.parse("due 1 null", 1),
            Ok(Command::SetDue {
                index: 1,
                when: None
            })
        );
        let parsed = p.parse("end 1 2025-02-03 10:00", 1).unwrap();
        assert_eq!(
            parsed,
            Command::SetDue {
                index: 1,
                when: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap().and_hms_opt(10, 0, 0)
            }
        );
        assert_eq!(p.parse("start 1", 1), Err(ParseError::IncompleteInput));
    }

    #[test]
    fn modify_splits_flags() {
        let p = parser();
        assert_eq!(
            p.parse("modify 1 -desc x -rank high", 1),
            Ok(Command::Modify {
                index: 1,
                changes: vec![
                    (ModifyFlag::Desc, "x".to_string()),
                    (ModifyFlag::Rank, "high".to_string())
                ]
            })
        );
        assert_eq!(p.parse("modify 1 nothing here", 1), Err(ParseError::IncompleteInput));
    }

    #[test]
    fn text_shape_requires_text() {
        let p = parser();
        assert_eq!(p.parse("add", 0), Err(ParseError::IncompleteInput));
        assert_eq!(p.parse("search   ", 0), Err(ParseError::IncompleteInput));
        assert_eq!(
            p.parse("find milk eggs", 0),
            Ok(Command::Search {
                phrase: "milk eggs".to_string()
            })
        );
    }

    #[test]
    fn machine_commands_parse() {
        let p = parser();
        assert_eq!(p.parse("recover 2", 0), Ok(Command::Recover { count: 2 }));
        assert_eq!(p.parse("dismiss 1", 1), Ok(Command::Dismiss { index: 1 }));
        assert_eq!(p.parse("unsort", 0), Ok(Command::Unsort));
    }
}
