//! Fixtures shared by the engine's unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tide_core::clock::{Clock, FixedClock};
use tide_core::entities::Task;
use tide_core::enums::TaskStatus;
use tide_core::patch::{NewTask, TaskPatch};
use tokio::sync::oneshot;

use crate::memory::MemoryStore;
use crate::store::{StoreError, TaskSink, TaskSource};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Noon UTC on `day`.
pub fn clock(day: &str) -> Arc<dyn Clock> {
    Arc::new(FixedClock::at_noon(date(day)))
}

/// A bare backlog task with the given status and no timestamps beyond
/// creation.
pub fn task(id: &str, status: TaskStatus) -> Task {
    let created = ts("2024-01-01T00:00:00Z");
    Task {
        id: id.to_string(),
        title: format!("task {id}"),
        description: None,
        group_id: None,
        created_by: None,
        status,
        due_date: None,
        due_time: None,
        original_due_date: None,
        completed_at: None,
        created_at: created,
        updated_at: created,
        deleted_at: None,
        assignees: Vec::new(),
    }
}

/// Insert a well-formed task into `store` and return it.
pub fn seeded(store: &MemoryStore, id: &str, status: TaskStatus, due: Option<&str>) -> Task {
    let mut t = task(id, status);
    t.due_date = due.map(date);
    t.original_due_date = t.due_date;
    if status == TaskStatus::Done {
        t.completed_at = Some(ts("2024-01-05T10:00:00Z"));
    }
    store.insert(t.clone());
    t
}

/// How a held write should finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Proceed,
    Fail,
}

/// Wraps a [`MemoryStore`] so that individual writes wait for the test to
/// release them.
///
/// Writes are keyed by task id (updates, deletes) or by title (creates).
/// Each [`GatedStore::hold`] queues one gate for the next write with that
/// key; writes without a queued gate pass straight through.
pub struct GatedStore {
    pub inner: MemoryStore,
    gates: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Release>>>>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn hold(&self, key: &str) -> oneshot::Sender<Release> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    async fn pass(&self, key: &str) -> Result<(), StoreError> {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        let Some(gate) = gate else {
            return Ok(());
        };
        match gate.await {
            Ok(Release::Proceed) => Ok(()),
            Ok(Release::Fail) | Err(_) => Err(StoreError::Unavailable("gated write failed".into())),
        }
    }
}

#[async_trait]
impl TaskSource for GatedStore {
    async fn fetch_active(&self, as_of: NaiveDate) -> Result<Vec<Task>, StoreError> {
        self.inner.fetch_active(as_of).await
    }

    async fn fetch_by_due_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        self.inner.fetch_by_due_range(start, end).await
    }

    async fn fetch_by_completion_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, StoreError> {
        self.inner.fetch_by_completion_range(start, end).await
    }

    async fn fetch_backlog(&self) -> Result<Vec<Task>, StoreError> {
        self.inner.fetch_backlog().await
    }
}

#[async_trait]
impl TaskSink for GatedStore {
    async fn create_task(&self, input: &NewTask) -> Result<Task, StoreError> {
        self.pass(&input.title).await?;
        self.inner.create_task(input).await
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        self.pass(id).await?;
        self.inner.update_task(id, patch).await
    }

    async fn soft_delete_task(&self, id: &str) -> Result<(), StoreError> {
        self.pass(id).await?;
        self.inner.soft_delete_task(id).await
    }
}

/// Yield until `condition` holds, so `tokio::join!` branches can make
/// progress in a test-controlled order.
pub async fn until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
