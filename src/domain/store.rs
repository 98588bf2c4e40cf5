//! Ordered task store
//!
//! Tasks are kept in a map keyed by lower-cased name, plus a separate display
//! sequence of keys. Both always hold the same set of names.

use std::collections::HashMap;

use thiserror::Error;

use super::task::{name_key, Task};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("A task with the name '{0}' already exists!")]
    DuplicateName(String),

    #[error("No task named '{0}' could be found!")]
    TaskNotFound(String),

    #[error("Stored task order does not match the stored tasks")]
    OrderMismatch,
}

/// Name-keyed tasks plus their display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedTaskStore {
    tasks: HashMap<String, Task>,
    order: Vec<String>,
}

impl OrderedTaskStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted map and sequence
    pub fn from_parts(
        tasks: HashMap<String, Task>,
        order: Vec<String>,
    ) -> Result<Self, StoreError> {
        let store = Self { tasks, order };
        if !store.is_consistent() {
            return Err(StoreError::OrderMismatch);
        }
        Ok(store)
    }

    /// Splits the store into its map and sequence
    pub fn into_parts(self) -> (HashMap<String, Task>, Vec<String>) {
        (self.tasks, self.order)
    }

    /// Appends a task at the end of the display order
    pub fn add(&mut self, task: Task) -> Result<(), StoreError> {
        let position = self.order.len();
        self.add_at(task, position)
    }

    /// Inserts a task at a 0-based position (clamped to the end)
    pub fn add_at(&mut self, task: Task, position: usize) -> Result<(), StoreError> {
        let key = task.key();
        if self.tasks.contains_key(&key) {
            return Err(StoreError::DuplicateName(task.name));
        }
        let position = position.min(self.order.len());
        self.order.insert(position, key.clone());
        self.tasks.insert(key, task);
        Ok(())
    }

    /// Removes a task by name, returning it with its former 0-based position
    pub fn remove(&mut self, name: &str) -> Result<(usize, Task), StoreError> {
        let key = name_key(name);
        let position = self
            .order
            .iter()
            .position(|k| *k == key)
            .ok_or_else(|| StoreError::TaskNotFound(name.to_string()))?;
        self.order.remove(position);
        let task = self
            .tasks
            .remove(&key)
            .ok_or_else(|| StoreError::TaskNotFound(name.to_string()))?;
        Ok((position, task))
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(&name_key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.get_mut(&name_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(&name_key(name))
    }

    /// 0-based display position of a task
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let key = name_key(name);
        self.order.iter().position(|k| *k == key)
    }

    /// Task at a 1-based display index
    pub fn get_at(&self, index: usize) -> Option<&Task> {
        let key = self.order.get(index.checked_sub(1)?)?;
        self.tasks.get(key)
    }

    /// Mutable task at a 1-based display index
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut Task> {
        let key = self.order.get(index.checked_sub(1)?)?;
        self.tasks.get_mut(key)
    }

    /// Renames a task in place, keeping its display position
    ///
    /// Changing only the casing of a name is allowed.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let old_key = name_key(old_name);
        let new_key = name_key(new_name);
        if new_key != old_key && self.tasks.contains_key(&new_key) {
            return Err(StoreError::DuplicateName(new_name.trim().to_string()));
        }

        let mut task = self
            .tasks
            .remove(&old_key)
            .ok_or_else(|| StoreError::TaskNotFound(old_name.to_string()))?;
        task.name = new_name.trim().to_string();
        self.tasks.insert(new_key.clone(), task);

        if let Some(slot) = self.order.iter_mut().find(|k| **k == old_key) {
            *slot = new_key;
        }
        Ok(())
    }

    /// Replaces the display order
    ///
    /// # Panics
    ///
    /// Panics if `names` is not a permutation of the stored names.
    pub fn set_order<S: AsRef<str>>(&mut self, names: &[S]) {
        let keys: Vec<String> = names.iter().map(|n| name_key(n.as_ref())).collect();
        let mut sorted_new = keys.clone();
        sorted_new.sort();
        sorted_new.dedup();
        let mut sorted_current = self.order.clone();
        sorted_current.sort();
        assert!(
            sorted_new.len() == keys.len() && sorted_new == sorted_current,
            "set_order called with a sequence that is not a permutation of the stored names"
        );
        self.order = keys;
    }

    /// Removes every task, returning them in display order
    pub fn clear(&mut self) -> Vec<Task> {
        let order = std::mem::take(&mut self.order);
        let mut tasks = std::mem::take(&mut self.tasks);
        order.into_iter().filter_map(|k| tasks.remove(&k)).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over tasks in display order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|k| self.tasks.get(k))
    }

    /// Iterates over (1-based index, task) pairs in display order
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &Task)> {
        self.iter().enumerate().map(|(i, t)| (i + 1, t))
    }

    /// Display names in display order
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|t| t.name.clone()).collect()
    }

    /// Checks the map/sequence invariant
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.tasks.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::new();
        self.order
            .iter()
            .all(|k| seen.insert(k) && self.tasks.get(k).is_some_and(|t| t.key() == *k))
    }
}
