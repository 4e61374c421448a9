//! Storage collaborator contract.
//!
//! The engine only reads through the three range predicates of
//! [`TaskSource`] and writes through [`TaskSink`]. Implementations decide
//! how tasks are persisted; `tide-db` provides a libSQL one and
//! [`crate::memory::MemoryStore`] an in-process one.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tide_core::entities::Task;
use tide_core::patch::{NewTask, TaskPatch};

/// Failure reported by a storage implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request (constraint, illegal transition).
    #[error("rejected by store: {0}")]
    Rejected(String),

    #[error("task not found: {id}")]
    NotFound { id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Range-filtered reads. Every method excludes soft-deleted tasks.
///
/// Results are expected sorted by `due_date`, `due_time`, `created_at`, but
/// the engine does not rely on it.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// TODO tasks with `due_date <= as_of`, however old.
    async fn fetch_active(&self, as_of: NaiveDate) -> Result<Vec<Task>, StoreError>;

    /// Tasks of any status with `due_date` in `[start, end]`.
    async fn fetch_by_due_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, StoreError>;

    /// DONE tasks with `completed_at` in `[start, end]`, dated or not.
    async fn fetch_by_completion_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError>;

    /// Tasks with no `due_date`, any status.
    async fn fetch_backlog(&self) -> Result<Vec<Task>, StoreError>;
}

/// Authoritative writes.
///
/// `update_task` applies `tide_core::mutation::apply_patch`, so
/// `completed_at` is managed automatically unless the patch sets it.
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError>;

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError>;

    async fn soft_delete_task(&self, id: &str) -> Result<(), StoreError>;
}

/// Anything that can both read and write tasks.
pub trait TaskStore: TaskSource + TaskSink {}

impl<T: TaskSource + TaskSink + ?Sized> TaskStore for T {}
