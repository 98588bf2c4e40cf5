//! JSONL storage for the task list
//!
//! Tasks are stored one JSON object per line, lines in display order, so the
//! store's map and sequence both come back from a single file. Uses file
//! locking for concurrent access safety.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{OrderedTaskStore, Task};

/// File holding the task list
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    /// Creates a handle for the file at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the task list; a missing file is an empty list
    pub fn read(&self) -> Result<OrderedTaskStore> {
        if !self.path.exists() {
            return Ok(OrderedTaskStore::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task file: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task file")?;

        let reader = BufReader::new(&file);
        let mut tasks = HashMap::new();
        let mut order = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            let key = task.key();
            if tasks.insert(key.clone(), task).is_some() {
                anyhow::bail!("Duplicate task name at line {}", line_num + 1);
            }
            order.push(key);
        }

        // Lock is released when file is dropped
        OrderedTaskStore::from_parts(tasks, order)
            .with_context(|| format!("Corrupt task file: {}", self.path.display()))
    }

    /// Writes the whole task list (full rewrite)
    pub fn write(&self, store: &OrderedTaskStore) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on task file")?;

            let mut writer = BufWriter::new(&file);

            for task in store.iter() {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task file")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}
