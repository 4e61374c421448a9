//! In-process implementation of the storage contract.
//!
//! `MemoryStore` behaves like an authoritative backend: it assigns `tsk-`
//! ids, applies the same mutation rules as `tide-db`, rejects illegal status
//! transitions, and hides soft-deleted tasks from every read. It can also be
//! told to fail writes or individual fetches, which is how rollback and
//! degraded loads are exercised.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tide_core::clock::{Clock, SystemClock};
use tide_core::entities::Task;
use tide_core::enums::TaskStatus;
use tide_core::ids::PREFIX_TASK;
use tide_core::mutation::{apply_patch, build_task};
use tide_core::patch::{NewTask, TaskPatch};
use tide_core::transition;

use crate::store::{StoreError, TaskSink, TaskSource};
use crate::window::FetchKind;

#[derive(Debug, Default)]
struct MemoryState {
    tasks: Vec<Task>,
    next_id: u64,
    failing_writes: usize,
    failing_fetches: HashSet<FetchKind>,
}

pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    state: Mutex<MemoryState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `task` as is, replacing any task with the same id.
    pub fn insert(&self, task: Task) {
        let mut state = self.state();
        match state.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => state.tasks.push(task),
        }
    }

    /// Stored version of a task, soft-deleted or not.
    #[must_use]
    pub fn stored(&self, id: &str) -> Option<Task> {
        self.state().tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Make the next `count` writes fail with `StoreError::Unavailable`.
    pub fn fail_writes(&self, count: usize) {
        self.state().failing_writes = count;
    }

    /// Make every fetch of `kind` fail until [`Self::heal`] is called.
    pub fn fail_fetch(&self, kind: FetchKind) {
        self.state().failing_fetches.insert(kind);
    }

    pub fn heal(&self) {
        let mut state = self.state();
        state.failing_writes = 0;
        state.failing_fetches.clear();
    }

    fn select<P>(&self, kind: FetchKind, predicate: P) -> Result<Vec<Task>, StoreError>
    where
        P: Fn(&Task) -> bool,
    {
        let state = self.state();
        if state.failing_fetches.contains(&kind) {
            return Err(StoreError::Unavailable(format!("{kind} fetch failed")));
        }
        let mut found: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| !t.is_deleted() && predicate(t))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.due_time.cmp(&b.due_time))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(found)
    }

    fn take_write_failure(state: &mut MemoryState) -> Result<(), StoreError> {
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(StoreError::Unavailable("write failed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskSource for MemoryStore {
    async fn fetch_active(&self, as_of: NaiveDate) -> Result<Vec<Task>, StoreError> {
        self.select(FetchKind::Active, |t| {
            t.status == TaskStatus::Todo && t.due_date.is_some_and(|due| due <= as_of)
        })
    }

    async fn fetch_by_due_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        self.select(FetchKind::DueRange, |t| {
            t.due_date.is_some_and(|due| start <= due && due <= end)
        })
    }

    async fn fetch_by_completion_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        self.select(FetchKind::CompletionRange, |t| {
            t.status == TaskStatus::Done
                && t.completed_at.is_some_and(|at| start <= at && at <= end)
        })
    }

    async fn fetch_backlog(&self) -> Result<Vec<Task>, StoreError> {
        self.select(FetchKind::Backlog, Task::is_backlog)
    }
}

#[async_trait]
impl TaskSink for MemoryStore {
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        input
            .validate()
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        let now = self.clock.now();
        let mut state = self.state();
        Self::take_write_failure(&mut state)?;

        state.next_id += 1;
        let id = format!("{PREFIX_TASK}-{:08x}", state.next_id);
        let task = build_task(id, input, now);
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        patch
            .validate()
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        let now = self.clock.now();
        let mut state = self.state();
        Self::take_write_failure(&mut state)?;

        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && !t.is_deleted())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        if let Some(target) = patch.status {
            if target != slot.status {
                transition::validate(slot.status, target)
                    .map_err(|e| StoreError::Rejected(e.to_string()))?;
            }
        }
        *slot = apply_patch(slot, patch, now);
        Ok(slot.clone())
    }

    async fn soft_delete_task(&self, id: &str) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut state = self.state();
        Self::take_write_failure(&mut state)?;

        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && !t.is_deleted())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        slot.deleted_at = Some(now);
        slot.updated_at = now;
        Ok(())
    }
}
