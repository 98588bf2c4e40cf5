//! Errors surfaced by the dispatcher

use thiserror::Error;

use super::parser::ParseError;
use crate::domain::StoreError;

/// Every error a command line can produce
///
/// All of these are expected and recoverable; the `Display` text is the
/// sentence shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("'{0}' is reserved for undo and cannot be entered directly!")]
    RestrictedCommand(String),
}

/// Stable classification of a [`CommandError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    UnknownCommand,
    IncompleteInput,
    IncompleteIndex,
    InvalidIndex,
    IndexOutOfBounds,
    InvalidRank,
    InvalidMark,
    InvalidFilter,
    InvalidSort,
    DateNotParseable,
    DuplicateName,
    TaskNotFound,
    InconsistentStore,
    RestrictedCommand,
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Parse(e) => match e {
                ParseError::EmptyInput => ErrorKind::EmptyInput,
                ParseError::UnknownCommand(_) => ErrorKind::UnknownCommand,
                ParseError::IncompleteInput => ErrorKind::IncompleteInput,
                ParseError::IncompleteIndex => ErrorKind::IncompleteIndex,
                ParseError::InvalidIndex => ErrorKind::InvalidIndex,
                ParseError::IndexOutOfBounds => ErrorKind::IndexOutOfBounds,
                ParseError::InvalidRank => ErrorKind::InvalidRank,
                ParseError::InvalidMark => ErrorKind::InvalidMark,
                ParseError::InvalidFilter => ErrorKind::InvalidFilter,
                ParseError::InvalidSort => ErrorKind::InvalidSort,
                ParseError::DateNotParseable => ErrorKind::DateNotParseable,
            },
            CommandError::Store(e) => match e {
                StoreError::DuplicateName(_) => ErrorKind::DuplicateName,
                StoreError::TaskNotFound(_) => ErrorKind::TaskNotFound,
                StoreError::OrderMismatch => ErrorKind::InconsistentStore,
            },
            CommandError::RestrictedCommand(_) => ErrorKind::RestrictedCommand,
        }
    }
}
