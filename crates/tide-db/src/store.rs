//! The storage contract of `tide-engine`, backed by libSQL.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tide_core::entities::Task;
use tide_core::patch::{NewTask, TaskPatch};
use tide_engine::{StoreError, TaskSink, TaskSource};

use crate::TaskDb;

#[async_trait]
impl TaskSource for TaskDb {
    async fn fetch_active(&self, as_of: NaiveDate) -> Result<Vec<Task>, StoreError> {
        Ok(self.list_active(as_of).await?)
    }

    async fn fetch_by_due_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        Ok(self.list_due_between(start, end).await?)
    }

    async fn fetch_by_completion_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        Ok(self.list_completed_between(start, end).await?)
    }

    async fn fetch_backlog(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.list_backlog().await?)
    }
}

#[async_trait]
impl TaskSink for TaskDb {
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        Ok(self.insert_task(input).await?)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        self.apply_update(id, patch).await.map_err(|e| e.for_task(id))
    }

    async fn soft_delete_task(&self, id: &str) -> Result<(), StoreError> {
        self.soft_delete(id).await.map_err(|e| e.for_task(id))
    }
}
