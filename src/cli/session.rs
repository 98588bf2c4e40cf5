//! One interpreter session bound to a task file
//!
//! Loads the store, feeds lines to the dispatcher, and writes the store back
//! whenever a command changed it.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::output::{Output, TaskRow};
use crate::domain::NaturalDates;
use crate::engine::{CommandError, Dispatcher, Reply};
use crate::storage::TaskFile;

const PROMPT: &str = "taskline> ";

pub struct Session {
    dispatcher: Dispatcher,
    file: TaskFile,
    dirty: bool,
}

impl Session {
    /// Opens the task file and starts a fresh session over its contents
    pub fn open(file: TaskFile, page_size: usize) -> Result<Self> {
        let store = file
            .read()
            .with_context(|| format!("Failed to load tasks from {}", file.path().display()))?;
        debug!(path = %file.path().display(), tasks = store.len(), "session opened");

        let dispatcher =
            Dispatcher::new(store, Box::new(NaturalDates::new())).with_page_size(page_size);
        Ok(Self {
            dispatcher,
            file,
            dirty: false,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Runs one line, remembering whether the store changed
    pub fn run_line(&mut self, line: &str) -> Result<Reply, CommandError> {
        let reply = self.dispatcher.handle(line)?;
        if reply.mutated {
            self.dirty = true;
        }
        Ok(reply)
    }

    /// Writes the store if anything changed since the last save
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.file.write(self.dispatcher.store())?;
        self.dirty = false;
        info!(path = %self.file.path().display(), "tasks saved");
        Ok(())
    }

    /// Rows for the tasks on the current page
    pub fn page_rows(&self) -> Vec<TaskRow> {
        let now = crate::domain::now();
        self.dispatcher
            .page_view()
            .into_iter()
            .map(|(index, task)| TaskRow::new(index, task, self.dispatcher.dates(), now))
            .collect()
    }

    /// Rows for every stored task
    pub fn all_rows(&self) -> Vec<TaskRow> {
        let now = crate::domain::now();
        self.dispatcher
            .store()
            .indexed()
            .map(|(index, task)| TaskRow::new(index, task, self.dispatcher.dates(), now))
            .collect()
    }

    /// Interactive loop: read, dispatch, print, save
    ///
    /// Stops on `exit` or end of input. Failed commands are reported and the
    /// loop carries on.
    pub fn repl(&mut self, input: impl BufRead, output: &Output) -> Result<()> {
        let interactive = std::io::stdin().is_terminal() && output.is_text();
        let mut lines = input.lines();

        loop {
            if interactive {
                print!("{}", PROMPT);
                std::io::stdout().flush().context("Failed to flush prompt")?;
            }

            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("Failed to read input")?;
            if line.trim().is_empty() {
                continue;
            }

            match self.run_line(&line) {
                Ok(reply) => {
                    output.success(&reply.message);
                    if reply.mutated {
                        self.save()?;
                    }
                    if reply.exit {
                        break;
                    }
                    if output.is_text() {
                        self.print_page(output);
                    }
                }
                Err(e) => {
                    output.verbose_ctx("shell", &format!("{:?}", e.kind()));
                    output.error(&e.to_string());
                }
            }
        }

        self.save()
    }

    fn print_page(&self, output: &Output) {
        output.tasks(&self.page_rows());
        println!(
            "Page {} of {}.",
            self.dispatcher.page() + 1,
            self.dispatcher.page_count()
        );
    }
}
