//! The per-session timeline engine.
//!
//! `TimelineEngine` owns the session's [`TaskCollection`] and is the only
//! thing that mutates it. Every mutation follows the same path:
//!
//! 1. validate, then snapshot the entity (or its absence, for creates);
//! 2. apply the change to the collection before any I/O;
//! 3. issue the remote write;
//! 4. on success merge the server's task, on failure restore the snapshot.
//!
//! Mutations are not serialized against each other. Each entity keeps a
//! queue of pending writes in apply order, each tagged with a version. A
//! write only touches the collection when it resolves as the newest pending
//! write for its entity; an older write instead hands its outcome to its
//! successor:
//!
//! | outcome | newest pending write        | older pending write                         |
//! |---------|-----------------------------|---------------------------------------------|
//! | success | merge server task           | successor's snapshot absorbs the server task |
//! | failure | restore snapshot exactly    | successor inherits this snapshot             |
//!
//! Once the newest write is confirmed, the older writes still pending for
//! that entity are superseded. A superseded failure is ignored, so it cannot
//! clobber confirmed server state; a superseded success still merges, since
//! its answer is the store's latest state.
//!
//! A write whose future is dropped before the store answers counts as a
//! failure.
//!
//! The collection lock is never held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tide_core::calendar::WeekStart;
use tide_core::clock::Clock;
use tide_core::entities::Task;
use tide_core::enums::{MutationKind, TaskStatus};
use tide_core::ids::{is_temporary, temporary_id};
use tide_core::mutation::{apply_patch, build_task, with_assignee_completion};
use tide_core::patch::{NewTask, TaskPatch, TaskPatchBuilder};
use tide_core::transition::{self, plan_status_change};

use crate::bucket::{assemble_backlog, assemble_bucket, assemble_range};
use crate::error::EngineError;
use crate::merge::{TaskCollection, merge_task};
use crate::rollover::TimelineEntry;
use crate::store::TaskStore;
use crate::window::{LoadReport, TimelineWindow, load_backlog, load_window};

// ---------------------------------------------------------------------------
// Pending-write bookkeeping
// ---------------------------------------------------------------------------

/// What to restore if a write fails.
#[derive(Debug, Clone)]
enum Snapshot {
    Present { position: usize, task: Task },
    Absent,
}

#[derive(Debug)]
struct PendingWrite {
    version: u64,
    kind: MutationKind,
    snapshot: Snapshot,
    /// A newer write on the same entity was confirmed, so a failure of this
    /// one has nothing left to roll back.
    superseded: bool,
}

enum Outcome {
    Confirmed(Option<Task>),
    Failed,
}

#[derive(Debug, Default)]
struct EngineState {
    tasks: TaskCollection,
    pending: HashMap<String, Vec<PendingWrite>>,
    next_version: u64,
}

impl EngineState {
    fn register(&mut self, id: &str, kind: MutationKind, snapshot: Snapshot) -> u64 {
        self.next_version += 1;
        let version = self.next_version;
        self.pending
            .entry(id.to_string())
            .or_default()
            .push(PendingWrite {
                version,
                kind,
                snapshot,
                superseded: false,
            });
        version
    }

    fn resolve(&mut self, id: &str, version: u64, outcome: Outcome) {
        let Some(queue) = self.pending.get_mut(id) else {
            tracing::debug!(task_id = id, version, "resolution for cleared write ignored");
            return;
        };
        let Some(idx) = queue.iter().position(|w| w.version == version) else {
            tracing::debug!(task_id = id, version, "resolution for unknown write ignored");
            return;
        };
        let write = queue.remove(idx);
        let newest = idx == queue.len();

        if write.superseded && matches!(outcome, Outcome::Failed) {
            tracing::debug!(task_id = id, version, "failure after a newer confirmation ignored");
        } else {
            Self::apply_outcome(&mut self.tasks, queue, id, idx, newest, write, outcome);
        }

        if queue.is_empty() {
            self.pending.remove(id);
        }
    }

    fn apply_outcome(
        tasks: &mut TaskCollection,
        queue: &mut [PendingWrite],
        id: &str,
        idx: usize,
        newest: bool,
        write: PendingWrite,
        outcome: Outcome,
    ) {
        let version = write.version;
        match outcome {
            Outcome::Confirmed(server) => {
                if newest {
                    for older in queue.iter_mut() {
                        older.superseded = true;
                    }
                    if let Some(server) = server {
                        if write.kind == MutationKind::Create {
                            let merged = tasks
                                .get(id)
                                .map_or_else(|| server.clone(), |local| merge_task(local, &server));
                            tasks.replace(id, &merged);
                        } else {
                            tasks.upsert(&server);
                        }
                    }
                } else if let Some(server) = server {
                    if let Snapshot::Present { task, .. } = &mut queue[idx].snapshot {
                        *task = merge_task(task, &server);
                    }
                    tracing::debug!(
                        task_id = id,
                        version,
                        "newer write pending; kept its optimistic state"
                    );
                }
            }
            Outcome::Failed => {
                if newest {
                    match write.snapshot {
                        Snapshot::Present { position, task } => tasks.insert_at(position, task),
                        Snapshot::Absent => {
                            tasks.remove(id);
                        }
                    }
                    tracing::warn!(
                        task_id = id,
                        kind = %write.kind,
                        "remote write failed; rolled back"
                    );
                } else {
                    queue[idx].snapshot = write.snapshot;
                    tracing::debug!(
                        task_id = id,
                        version,
                        "remote write failed under a newer write; rollback deferred"
                    );
                }
            }
        }
    }
}

/// Resolves its write as failed if dropped before being settled.
struct InFlight<'a, S: TaskStore + ?Sized> {
    engine: &'a TimelineEngine<S>,
    id: String,
    version: u64,
    armed: bool,
}

impl<'a, S: TaskStore + ?Sized> InFlight<'a, S> {
    fn new(engine: &'a TimelineEngine<S>, id: &str, version: u64) -> Self {
        Self {
            engine,
            id: id.to_string(),
            version,
            armed: true,
        }
    }

    fn settle(mut self, outcome: Outcome) {
        self.armed = false;
        self.engine.state().resolve(&self.id, self.version, outcome);
    }
}

impl<S: TaskStore + ?Sized> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(task_id = %self.id, "write abandoned before the store answered");
            self.engine
                .state()
                .resolve(&self.id, self.version, Outcome::Failed);
        }
    }
}

// ---------------------------------------------------------------------------
// TimelineEngine
// ---------------------------------------------------------------------------

/// Session-scoped task collection with optimistic mutations.
pub struct TimelineEngine<S: TaskStore + ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    state: Mutex<EngineState>,
    temp_seq: AtomicU64,
}

impl<S: TaskStore + ?Sized> TimelineEngine<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            state: Mutex::new(EngineState::default()),
            temp_seq: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Today's date according to the engine's clock.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // -- reads -------------------------------------------------------------

    /// Load `window` and merge it into the collection.
    ///
    /// Tasks with a write in flight keep their optimistic state.
    pub async fn refresh(&self, window: TimelineWindow) -> LoadReport {
        let loaded = load_window(
            self.store.as_ref(),
            window,
            self.today(),
            self.clock.offset(),
        )
        .await;
        let (batches, report) = loaded.into_report(Some(window));
        self.absorb(&batches);
        report
    }

    /// Load the backlog and merge it into the collection.
    pub async fn refresh_backlog(&self) -> LoadReport {
        let (batches, report) = load_backlog(self.store.as_ref()).await.into_report(None);
        self.absorb(&batches);
        report
    }

    /// Merge tasks fetched outside a window load, such as a lookup by id.
    ///
    /// Same rules as [`Self::refresh`]: pending ids are skipped.
    pub fn adopt(&self, tasks: Vec<Task>) {
        self.absorb(&[tasks]);
    }

    fn absorb(&self, batches: &[Vec<Task>]) {
        let mut state = self.state();
        let EngineState { tasks, pending, .. } = &mut *state;
        let settled: Vec<Vec<Task>> = batches
            .iter()
            .map(|batch| {
                batch
                    .iter()
                    .filter(|t| !pending.contains_key(&t.id))
                    .cloned()
                    .collect()
            })
            .collect();
        tasks.merge_batches(settled.iter().map(Vec::as_slice));
    }

    /// Every task currently held, in collection order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state().tasks.iter().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Task> {
        self.state().tasks.get(id).cloned()
    }

    /// Tasks displayed under `date`.
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Vec<TimelineEntry> {
        let today = self.today();
        let offset = self.clock.offset();
        assemble_bucket(&self.state().tasks, date, today, offset)
    }

    /// One bucket per date of `window`.
    #[must_use]
    pub fn range(&self, window: TimelineWindow) -> BTreeMap<NaiveDate, Vec<TimelineEntry>> {
        let today = self.today();
        let offset = self.clock.offset();
        assemble_range(&self.state().tasks, &window.dates(), today, offset)
    }

    /// The seven buckets of the week containing `anchor`.
    #[must_use]
    pub fn week(
        &self,
        anchor: NaiveDate,
        week_start: WeekStart,
    ) -> BTreeMap<NaiveDate, Vec<TimelineEntry>> {
        self.range(TimelineWindow::week_of(anchor, week_start))
    }

    #[must_use]
    pub fn backlog(&self) -> Vec<Task> {
        assemble_backlog(&self.state().tasks)
    }

    /// Number of writes still waiting for the store.
    #[must_use]
    pub fn pending_mutations(&self) -> usize {
        self.state().pending.values().map(Vec::len).sum()
    }

    /// Drop all session state. Writes still in flight resolve into nothing.
    pub fn clear(&self) {
        let mut state = self.state();
        state.tasks.clear();
        state.pending.clear();
        tracing::info!("timeline session cleared");
    }

    // -- writes ------------------------------------------------------------

    /// Create a task under a temporary id, then swap in the server's task.
    ///
    /// # Errors
    ///
    /// `Validation` for invalid input; `RemoteWrite` when the store fails, in
    /// which case the temporary task is removed again.
    pub async fn create_task(&self, input: NewTask) -> Result<Task, EngineError> {
        input.validate()?;

        let temp_id = temporary_id(self.temp_seq.fetch_add(1, Ordering::Relaxed) + 1);
        let version = {
            let mut state = self.state();
            state
                .tasks
                .upsert(&build_task(temp_id.clone(), &input, self.clock.now()));
            state.register(&temp_id, MutationKind::Create, Snapshot::Absent)
        };

        let guard = InFlight::new(self, &temp_id, version);
        match self.store.create_task(&input).await {
            Ok(server) => {
                guard.settle(Outcome::Confirmed(Some(server.clone())));
                tracing::info!(task_id = %server.id, temp_id = %temp_id, "task created");
                Ok(server)
            }
            Err(source) => {
                guard.settle(Outcome::Failed);
                Err(EngineError::RemoteWrite {
                    kind: MutationKind::Create,
                    id: temp_id,
                    source,
                })
            }
        }
    }

    /// Apply `patch` to task `id`.
    ///
    /// # Errors
    ///
    /// `PendingCreate`, `NotFound`, `Validation` or `Transition` before
    /// anything is applied; `RemoteWrite` after a rollback.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, EngineError> {
        self.mutate(id, move |_, _| Ok(patch)).await
    }

    /// Move task `id` to `target`, including the backlog-uncheck rule.
    ///
    /// # Errors
    ///
    /// As [`Self::update_task`]; `Transition` for an illegal change.
    pub async fn set_status(&self, id: &str, target: TaskStatus) -> Result<Task, EngineError> {
        self.mutate(id, move |task, today| {
            Ok(plan_status_change(task, target, today)?)
        })
        .await
    }

    /// TODO becomes DONE and DONE becomes TODO. A cancelled task must be
    /// restored first.
    ///
    /// # Errors
    ///
    /// As [`Self::set_status`].
    pub async fn toggle_done(&self, id: &str) -> Result<Task, EngineError> {
        self.mutate(id, |task, today| {
            let target = if task.status == TaskStatus::Done {
                TaskStatus::Todo
            } else {
                TaskStatus::Done
            };
            Ok(plan_status_change(task, target, today)?)
        })
        .await
    }

    /// Give task `id` a new due date and time. `original_due_date` is kept
    /// unless the task comes out of the backlog.
    ///
    /// # Errors
    ///
    /// As [`Self::update_task`].
    pub async fn reschedule(
        &self,
        id: &str,
        due_date: NaiveDate,
        due_time: Option<NaiveTime>,
    ) -> Result<Task, EngineError> {
        let patch = TaskPatchBuilder::new()
            .due_date(Some(due_date))
            .due_time(due_time)
            .build();
        self.update_task(id, patch).await
    }

    /// Send task `id` back to the backlog, wiping its schedule.
    ///
    /// # Errors
    ///
    /// `Validation` if the task is already in the backlog, otherwise as
    /// [`Self::update_task`].
    pub async fn move_to_backlog(&self, id: &str) -> Result<Task, EngineError> {
        self.mutate(id, |task, _| {
            if task.is_backlog() {
                return Err(EngineError::Validation(format!(
                    "task {} is already in the backlog",
                    task.id
                )));
            }
            Ok(TaskPatchBuilder::new().due_date(None).build())
        })
        .await
    }

    /// Flip one assignee's completion flag on a group task.
    ///
    /// # Errors
    ///
    /// `Validation` if `user_id` is not assigned, otherwise as
    /// [`Self::update_task`].
    pub async fn set_assignee_completed(
        &self,
        id: &str,
        user_id: &str,
        completed: bool,
    ) -> Result<Task, EngineError> {
        let now = self.clock.now();
        self.mutate(id, |task, _| {
            let assignees = with_assignee_completion(task, user_id, completed, now)
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "{user_id} is not assigned to task {}",
                        task.id
                    ))
                })?;
            Ok(TaskPatchBuilder::new().assignees(assignees).build())
        })
        .await
    }

    /// Soft-delete task `id`, removing it from the collection immediately.
    ///
    /// # Errors
    ///
    /// `PendingCreate` or `NotFound` before anything is applied;
    /// `RemoteWrite` after the task has been put back.
    pub async fn delete_task(&self, id: &str) -> Result<(), EngineError> {
        let version = {
            let mut state = self.state();
            Self::ensure_confirmed(id)?;
            let (position, task) = state
                .tasks
                .remove(id)
                .ok_or_else(|| EngineError::NotFound { id: id.to_string() })?;
            state.register(id, MutationKind::Delete, Snapshot::Present { position, task })
        };

        let guard = InFlight::new(self, id, version);
        match self.store.soft_delete_task(id).await {
            Ok(()) => {
                guard.settle(Outcome::Confirmed(None));
                tracing::info!(task_id = id, "task deleted");
                Ok(())
            }
            Err(source) => {
                guard.settle(Outcome::Failed);
                Err(EngineError::RemoteWrite {
                    kind: MutationKind::Delete,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    fn ensure_confirmed(id: &str) -> Result<(), EngineError> {
        if is_temporary(id) {
            return Err(EngineError::PendingCreate { id: id.to_string() });
        }
        Ok(())
    }

    /// Shared update path. `plan` sees the current local state of the task,
    /// including any optimistic changes still in flight.
    async fn mutate<F>(&self, id: &str, plan: F) -> Result<Task, EngineError>
    where
        F: FnOnce(&Task, NaiveDate) -> Result<TaskPatch, EngineError>,
    {
        Self::ensure_confirmed(id)?;
        let today = self.today();
        let now: DateTime<Utc> = self.clock.now();

        let (patch, version) = {
            let mut state = self.state();
            let (position, current) = state
                .tasks
                .locate(id)
                .map(|(pos, task)| (pos, task.clone()))
                .ok_or_else(|| EngineError::NotFound { id: id.to_string() })?;

            let patch = plan(&current, today)?;
            patch.validate()?;
            if patch.is_empty() {
                return Err(EngineError::Validation("nothing to change".into()));
            }
            if let Some(target) = patch.status {
                if target != current.status {
                    transition::validate(current.status, target)?;
                }
            }

            state.tasks.put(apply_patch(&current, &patch, now));
            let version = state.register(
                id,
                MutationKind::Update,
                Snapshot::Present {
                    position,
                    task: current,
                },
            );
            (patch, version)
        };

        let guard = InFlight::new(self, id, version);
        match self.store.update_task(id, &patch).await {
            Ok(server) => {
                guard.settle(Outcome::Confirmed(Some(server.clone())));
                tracing::info!(task_id = id, "task updated");
                Ok(server)
            }
            Err(source) => {
                guard.settle(Outcome::Failed);
                Err(EngineError::RemoteWrite {
                    kind: MutationKind::Update,
                    id: id.to_string(),
                    source,
                })
            }
        }
    }
}
