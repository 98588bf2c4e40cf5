//! Command dispatcher
//!
//! The single entry point of the interpreter. A line is checked for
//! machine-only keywords, parsed, executed against the store, and, if it
//! changed anything, its inverse is recorded for undo.

use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use super::command::{Command, Keyword, PageMove, HELP};
use super::error::CommandError;
use super::parser::{CommandParser, ParseError};
use super::search::{self, Criterion};
use super::sort::{self, SortKey, SortOrder};
use super::undo::{self, DumpedTask, UndoEngine};
use crate::domain::mutator::{self, MutationResult};
use crate::domain::{DateParser, Mark, ModifyFlag, OrderedTaskStore, Task};

/// Default number of tasks per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Result of a successfully handled line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    /// The task list changed and should be persisted
    pub mutated: bool,
    /// The user asked to leave
    pub exit: bool,
}

impl Reply {
    fn changed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mutated: true,
            exit: false,
        }
    }

    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mutated: false,
            exit: false,
        }
    }
}

/// Active search or filter narrowing the visible list
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Search(String),
    Filter(Criterion),
}

/// Where a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Typed by the user; machine-only commands are refused
    User,
    /// Replayed by undo; machine-only commands allowed, nothing recorded
    Replay,
}

/// Owns the store, parser and undo stacks of one session
pub struct Dispatcher {
    store: OrderedTaskStore,
    parser: CommandParser,
    undo: UndoEngine,
    query: Option<Query>,
    page: usize,
    page_size: usize,
    clock: Option<NaiveDateTime>,
}

impl Dispatcher {
    pub fn new(store: OrderedTaskStore, dates: Box<dyn DateParser>) -> Self {
        Self {
            store,
            parser: CommandParser::new(dates),
            undo: UndoEngine::new(),
            query: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            clock: None,
        }
    }

    /// Sets the number of tasks per page (at least one)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Pins "now" for overdue/inactive checks
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.clock = Some(now);
        self
    }

    /// Handles one line of user input
    pub fn handle(&mut self, line: &str) -> Result<Reply, CommandError> {
        self.execute(line, Mode::User)
    }

    pub fn store(&self) -> &OrderedTaskStore {
        &self.store
    }

    pub fn into_store(self) -> OrderedTaskStore {
        self.store
    }

    pub fn dates(&self) -> &dyn DateParser {
        self.parser.dates()
    }

    /// Number of changes that can still be undone
    pub fn undo_depth(&self) -> usize {
        self.undo.depth()
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// 1-based indices of the tasks the active query lets through
    pub fn visible_indices(&self) -> Vec<usize> {
        match &self.query {
            None => (1..=self.store.len()).collect(),
            Some(Query::Search(phrase)) => search::find(&self.store, phrase),
            Some(Query::Filter(criterion)) => search::filter(&self.store, criterion, self.now()),
        }
    }

    /// Visible tasks on the current page, with their store indices
    pub fn page_view(&self) -> Vec<(usize, &Task)> {
        self.visible_indices()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .filter_map(|index| self.store.get_at(index).map(|task| (index, task)))
            .collect()
    }

    /// 0-based current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.visible_indices().len().div_ceil(self.page_size).max(1)
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(crate::domain::now)
    }

    fn execute(&mut self, line: &str, mode: Mode) -> Result<Reply, CommandError> {
        if mode == Mode::User {
            let keyword = line.split_whitespace().next().and_then(Keyword::from_word);
            if let Some(keyword) = keyword.filter(Keyword::is_restricted) {
                warn!(%keyword, "refused machine-only command");
                return Err(CommandError::RestrictedCommand(keyword.to_string()));
            }
        }

        let command = self.parser.parse(line, self.store.len())?;
        // the store may have changed since the count was sampled
        if let Some(index) = command.index() {
            self.task_at(index)?;
        }
        debug!(?command, ?mode, "dispatching");

        let reply = self.run(command, mode)?;
        self.clamp_page();
        Ok(reply)
    }

    fn run(&mut self, command: Command, mode: Mode) -> Result<Reply, CommandError> {
        match command {
            Command::Add { name } => self.add(name, mode),
            Command::Delete { index } => self.delete(index, mode),
            Command::Dismiss { index } => self.dismiss(index),
            Command::Describe { index, text } => self.mutate(
                index,
                mode,
                |before, _| undo::for_description(index, before.description.as_deref()),
                |task, _| mutator::set_description(task, &text),
            ),
            Command::SetDue { index, when } => self.mutate(
                index,
                mode,
                |before, dates| undo::for_deadline(index, before.deadline, dates),
                |task, dates| mutator::set_deadline(task, when, dates),
            ),
            Command::SetStart { index, when } => self.mutate(
                index,
                mode,
                |before, dates| undo::for_start(index, before.start, dates),
                |task, dates| mutator::set_start_time(task, when, dates),
            ),
            Command::Rank { index, rank } => self.mutate(
                index,
                mode,
                |before, _| undo::for_rank(index, before.rank),
                |task, _| mutator::set_rank(task, rank.keyword()),
            ),
            Command::Mark { index, mark } => self.mutate(
                index,
                mode,
                |before, _| undo::for_mark(index, Mark::of(before)),
                |task, _| mutator::mark(task, mark),
            ),
            Command::Tag { index, tags } => self.mutate(
                index,
                mode,
                |before, _| undo::for_tags(index, &before.tags),
                |task, _| mutator::add_tags(task, &tags),
            ),
            Command::Untag { index, tags } => self.mutate(
                index,
                mode,
                |before, _| undo::for_tags(index, &before.tags),
                |task, _| mutator::remove_tags(task, &tags),
            ),
            Command::Rename { index, name } => self.rename(index, &name, mode),
            Command::Modify { index, changes } => self.modify(index, changes, mode),
            Command::View { index } => {
                let task = self.task_at(index)?;
                Ok(Reply::unchanged(render_task(index, task, self.dates(), self.now())))
            }
            Command::Search { phrase } => {
                let reply = format!("Search results for '{}'", phrase);
                self.set_query(Some(Query::Search(phrase)), reply)
            }
            Command::Filter { criterion } => {
                let reply = format!("Filter: {}", criterion);
                self.set_query(Some(Query::Filter(criterion)), reply)
            }
            Command::ClearSearch => self.set_query(None, "Showing all tasks".to_string()),
            Command::Sort { key, order } => self.sort(key, order, mode),
            Command::Unsort => self.unsort(),
            Command::Clear => self.clear(mode),
            Command::Recover { count } => self.recover(count),
            Command::Undo => self.undo(mode),
            Command::Page(movement) => self.turn_page(movement),
            Command::Help => Ok(Reply::unchanged(HELP)),
            Command::Exit => Ok(Reply {
                message: "Goodbye!".to_string(),
                mutated: false,
                exit: true,
            }),
        }
    }

    fn task_at(&self, index: usize) -> Result<&Task, CommandError> {
        self.store
            .get_at(index)
            .ok_or(CommandError::Parse(ParseError::IndexOutOfBounds))
    }

    fn record(&mut self, mode: Mode, inverse: String) {
        if mode == Mode::User {
            debug!(%inverse, "recorded inverse");
            self.undo.record(inverse);
        }
    }

    fn add(&mut self, name: String, mode: Mode) -> Result<Reply, CommandError> {
        self.store.add(Task::new(name.trim()))?;
        let index = self.store.len();
        self.record(mode, undo::for_add(index));
        info!(task = %name, index, "task added");
        Ok(Reply::changed(format!("Added '{}'.", name.trim())))
    }

    fn delete(&mut self, index: usize, mode: Mode) -> Result<Reply, CommandError> {
        let name = self.task_at(index)?.name.clone();
        let (position, task) = self.store.remove(&name)?;
        if mode == Mode::User {
            self.undo.record_removal(vec![DumpedTask { position, task }]);
        }
        info!(task = %name, "task deleted");
        Ok(Reply::changed(format!("Deleted '{}'.", name)))
    }

    fn dismiss(&mut self, index: usize) -> Result<Reply, CommandError> {
        let name = self.task_at(index)?.name.clone();
        self.store.remove(&name)?;
        Ok(Reply::changed(format!("Removed '{}'.", name)))
    }

    /// Applies a single-attribute change and records its inverse
    ///
    /// `inverse` sees the task as it was before `change` ran.
    fn mutate<I, C>(
        &mut self,
        index: usize,
        mode: Mode,
        inverse: I,
        change: C,
    ) -> Result<Reply, CommandError>
    where
        I: FnOnce(&Task, &dyn DateParser) -> String,
        C: FnOnce(&mut Task, &dyn DateParser) -> MutationResult,
    {
        let dates = self.parser.dates();
        let task = self
            .store
            .get_at_mut(index)
            .ok_or(CommandError::Parse(ParseError::IndexOutOfBounds))?;
        let before = task.clone();
        let result = change(task, dates);
        if !result.applied {
            warn!(task = %before.name, reason = %result.message, "change rejected");
            return Ok(Reply::unchanged(result.message));
        }

        let inverse = inverse(&before, dates);
        self.record(mode, inverse);
        info!(task = %before.name, "task updated");
        Ok(Reply::changed(result.message))
    }

    fn rename(&mut self, index: usize, name: &str, mode: Mode) -> Result<Reply, CommandError> {
        let old = self.task_at(index)?.name.clone();
        self.store.rename(&old, name)?;
        self.record(mode, undo::for_rename(index, &old));
        info!(from = %old, to = %name.trim(), "task renamed");
        Ok(Reply::changed(format!("Renamed '{}' to '{}'.", old, name.trim())))
    }

    /// Applies each (flag, content) pair in order, one inverse per change
    ///
    /// A failing pair is reported in the reply and skipped. `-name` goes
    /// through the store so the new name is checked and re-keyed.
    fn modify(
        &mut self,
        index: usize,
        changes: Vec<(ModifyFlag, String)>,
        mode: Mode,
    ) -> Result<Reply, CommandError> {
        let mut messages = Vec::with_capacity(changes.len());
        let mut mutated = false;

        for (flag, content) in changes {
            let reply = match flag {
                ModifyFlag::Name if content.trim().is_empty() => {
                    Reply::unchanged("A task needs a name, the name was left unchanged.")
                }
                ModifyFlag::Name => match self.rename(index, &content, mode) {
                    Ok(reply) => reply,
                    Err(e) => Reply::unchanged(e.to_string()),
                },
                _ => self.mutate(
                    index,
                    mode,
                    |before, dates| undo::for_modification(flag, index, before, dates),
                    |task, dates| mutator::apply_modification(task, flag, &content, dates),
                )?,
            };
            mutated |= reply.mutated;
            messages.push(reply.message);
        }

        Ok(Reply {
            message: messages.join("\n"),
            mutated,
            exit: false,
        })
    }

    fn set_query(&mut self, query: Option<Query>, label: String) -> Result<Reply, CommandError> {
        self.query = query;
        self.page = 0;
        let shown = self.visible_indices().len();
        Ok(Reply::unchanged(format!("{}: {} task(s).", label, shown)))
    }

    fn sort(&mut self, key: SortKey, order: SortOrder, mode: Mode) -> Result<Reply, CommandError> {
        let previous = self.store.names();
        let now = self.now();
        let summary = sort::sort(&mut self.store, key, order, now);
        if mode == Mode::User {
            self.undo.record_reorder(previous);
        }
        info!(key = key.label(), %order, "tasks sorted");
        Ok(Reply::changed(summary))
    }

    fn unsort(&mut self) -> Result<Reply, CommandError> {
        match self.undo.take_order() {
            Some(order) => {
                self.store.set_order(&order);
                Ok(Reply::changed("Restored the previous order."))
            }
            None => Ok(Reply::unchanged("There is no earlier order to restore.")),
        }
    }

    fn clear(&mut self, mode: Mode) -> Result<Reply, CommandError> {
        let removed = self.store.clear();
        if removed.is_empty() {
            return Ok(Reply::unchanged("There are no tasks to clear."));
        }

        let count = removed.len();
        if mode == Mode::User {
            let dumped = removed
                .into_iter()
                .enumerate()
                .map(|(position, task)| DumpedTask { position, task })
                .collect();
            self.undo.record_removal(dumped);
        }
        info!(count, "tasks cleared");
        Ok(Reply::changed(format!("Cleared {} task(s).", count)))
    }

    fn recover(&mut self, count: usize) -> Result<Reply, CommandError> {
        let dumped = self
            .undo
            .take_dumped(count)
            .ok_or(CommandError::Parse(ParseError::IndexOutOfBounds))?;
        let mut dumped = dumped.into_iter();
        while let Some(DumpedTask { position, task }) = dumped.next() {
            let name = task.name.clone();
            if let Err(e) = self.store.add_at(task, position) {
                let lost: Vec<String> = std::iter::once(name)
                    .chain(dumped.map(|d| d.task.name))
                    .collect();
                error!(?lost, error = %e, "removed tasks could not be recovered");
                return Err(e.into());
            }
        }
        Ok(Reply::changed(format!("Recovered {} task(s).", count)))
    }

    fn undo(&mut self, mode: Mode) -> Result<Reply, CommandError> {
        if mode == Mode::Replay {
            return Ok(Reply::unchanged("Nothing to undo."));
        }
        let Some(inverse) = self.undo.pop() else {
            return Ok(Reply::unchanged("Nothing to undo."));
        };

        debug!(%inverse, "replaying inverse");
        match self.execute(&inverse, Mode::Replay) {
            Ok(reply) => Ok(Reply {
                message: format!("Undone. {}", reply.message),
                mutated: reply.mutated,
                exit: false,
            }),
            Err(e) => {
                // the inverse is already popped; the change stays in place
                error!(%inverse, error = %e, "inverse command failed, change cannot be undone");
                Err(e)
            }
        }
    }

    fn turn_page(&mut self, movement: PageMove) -> Result<Reply, CommandError> {
        let count = self.page_count();
        let last = count - 1;
        match movement {
            PageMove::First => self.page = 0,
            PageMove::Last => self.page = last,
            PageMove::Prev if self.page == 0 => {
                return Ok(Reply::unchanged("You are already on the first page."))
            }
            PageMove::Prev => self.page -= 1,
            PageMove::Next if self.page >= last => {
                return Ok(Reply::unchanged("You are already on the last page."))
            }
            PageMove::Next => self.page += 1,
            PageMove::To(number) => {
                if number > count {
                    return Err(ParseError::IndexOutOfBounds.into());
                }
                self.page = number - 1;
            }
        }
        Ok(Reply::unchanged(format!("Page {} of {}.", self.page + 1, count)))
    }

    fn clamp_page(&mut self) {
        let last = self.page_count() - 1;
        if self.page > last {
            self.page = last;
        }
    }
}

/// Multi-line detail view of one task
pub fn render_task(index: usize, task: &Task, dates: &dyn DateParser, now: NaiveDateTime) -> String {
    let when = |value: Option<NaiveDateTime>| match value {
        Some(ts) => dates.format(ts),
        None => "-".to_string(),
    };
    let status = if task.done {
        "done"
    } else if task.is_overdue_at(now) {
        "overdue"
    } else if task.is_inactive_at(now) {
        "not started"
    } else {
        "ongoing"
    };
    let tags = if task.tags.is_empty() {
        "-".to_string()
    } else {
        task.tags.joined()
    };

    format!(
        "#{} {}\n  Description: {}\n  Start:       {}\n  Deadline:    {}\n  Rank:        {}\n  Tags:        {}\n  Status:      {}",
        index,
        task.name,
        task.description.as_deref().unwrap_or("-"),
        when(task.start),
        when(task.deadline),
        task.rank,
        tags,
        status,
    )
}
