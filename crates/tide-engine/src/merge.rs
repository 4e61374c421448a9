//! Identity-keyed task collection and the merge rules that feed it.
//!
//! Incoming task versions win field by field, except `assignees`: existing
//! assignees keep their position and only have `is_completed`/`completed_at`
//! refreshed when the incoming version lists them, and new assignees are
//! appended in incoming order. An existing assignee the incoming version does
//! not mention is kept unchanged.
//!
//! Batches fetched for the same load are different views of overlapping data,
//! so among themselves the first batch to mention a task wins; the winner is
//! then merged into the existing collection. Merging is idempotent.

use std::collections::{HashMap, HashSet};

use tide_core::entities::{Assignee, Task};

/// Merge `incoming` into `existing`, returning the reconciled task.
#[must_use]
pub fn merge_task(existing: &Task, incoming: &Task) -> Task {
    Task {
        assignees: reconcile_assignees(&existing.assignees, &incoming.assignees),
        ..incoming.clone()
    }
}

/// Order-preserving assignee reconciliation.
#[must_use]
pub fn reconcile_assignees(existing: &[Assignee], incoming: &[Assignee]) -> Vec<Assignee> {
    let mut merged: Vec<Assignee> = existing
        .iter()
        .map(|current| {
            incoming
                .iter()
                .find(|a| a.user_id == current.user_id)
                .map_or_else(
                    || current.clone(),
                    |fresh| Assignee {
                        user_id: current.user_id.clone(),
                        is_completed: fresh.is_completed,
                        completed_at: fresh.completed_at,
                    },
                )
        })
        .collect();

    for fresh in incoming {
        if !existing.iter().any(|a| a.user_id == fresh.user_id) {
            merged.push(fresh.clone());
        }
    }
    merged
}

/// The engine's single in-memory task collection.
///
/// Tasks keep their insertion position; `index` maps an id to that position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&pos| &self.tasks[pos])
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// The task and its position.
    #[must_use]
    pub fn locate(&self, id: &str) -> Option<(usize, &Task)> {
        self.index.get(id).map(|&pos| (pos, &self.tasks[pos]))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Task> {
        self.tasks
    }

    /// Merge one incoming version. A soft-deleted version removes the task.
    pub fn upsert(&mut self, incoming: &Task) {
        if incoming.is_deleted() {
            self.remove(&incoming.id);
            return;
        }
        match self.index.get(&incoming.id) {
            Some(&pos) => {
                let merged = merge_task(&self.tasks[pos], incoming);
                self.tasks[pos] = merged;
            }
            None => self.push(incoming.clone()),
        }
    }

    /// Overwrite (or append) without merge rules. Used to restore snapshots.
    pub fn put(&mut self, task: Task) {
        match self.index.get(&task.id) {
            Some(&pos) => self.tasks[pos] = task,
            None => self.push(task),
        }
    }

    /// Put `task` back at `position`, clamped to the current length.
    pub fn insert_at(&mut self, position: usize, task: Task) {
        if self.contains(&task.id) {
            self.put(task);
            return;
        }
        let position = position.min(self.tasks.len());
        self.tasks.insert(position, task);
        self.reindex_from(position);
    }

    /// Remove a task, returning it with its former position.
    pub fn remove(&mut self, id: &str) -> Option<(usize, Task)> {
        let pos = self.index.remove(id)?;
        let task = self.tasks.remove(pos);
        self.reindex_from(pos);
        Some((pos, task))
    }

    /// Swap the task at `old_id` for `task`, keeping its position.
    ///
    /// If `task.id` is already present elsewhere, `task` is merged into that
    /// entry and `old_id` is removed instead.
    pub fn replace(&mut self, old_id: &str, task: &Task) {
        if old_id != task.id && self.contains(&task.id) {
            self.remove(old_id);
            self.upsert(task);
            return;
        }
        match self.index.remove(old_id) {
            Some(pos) => {
                self.index.insert(task.id.clone(), pos);
                self.tasks[pos] = task.clone();
            }
            None => self.upsert(task),
        }
    }

    /// Merge several batches: first batch wins among batches, then each
    /// winner is merged into the collection.
    pub fn merge_batches<'a, I>(&mut self, batches: I)
    where
        I: IntoIterator<Item = &'a [Task]>,
    {
        let mut seen = HashSet::new();
        let mut merged = 0usize;
        for batch in batches {
            for task in batch {
                if seen.insert(task.id.as_str()) {
                    self.upsert(task);
                    merged += 1;
                }
            }
        }
        tracing::debug!(merged, total = self.len(), "merged task batches");
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.index.clear();
    }

    fn push(&mut self, task: Task) {
        self.index.insert(task.id.clone(), self.tasks.len());
        self.tasks.push(task);
    }

    fn reindex_from(&mut self, start: usize) {
        for (pos, task) in self.tasks.iter().enumerate().skip(start) {
            self.index.insert(task.id.clone(), pos);
        }
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// Pure form of [`TaskCollection::merge_batches`].
#[must_use]
pub fn merge(existing: &TaskCollection, batches: &[Vec<Task>]) -> TaskCollection {
    let mut next = existing.clone();
    next.merge_batches(batches.iter().map(Vec::as_slice));
    next
}
