//! Date bucketing: which calendar date a task is displayed under.
//!
//! Each task lands in at most one bucket:
//! - DONE: the local date of `completed_at`;
//! - TODO due before today: today (rollover collapses into today);
//! - TODO due today or later, and CANCEL: `due_date`;
//! - no `due_date` (backlog), soft-deleted, or DONE without `completed_at`:
//!   no bucket.
//!
//! Inside a bucket, order is by first-scheduled date, then `due_time` (timed
//! before untimed), then `created_at`. Status plays no part, so completing a task does not move it.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{FixedOffset, NaiveDate};
use tide_core::calendar::local_date;
use tide_core::entities::Task;
use tide_core::enums::TaskStatus;

use crate::rollover::TimelineEntry;

/// The date `task` is displayed under, or `None` if it belongs to no date.
#[must_use]
pub fn bucket_date(task: &Task, today: NaiveDate, offset: FixedOffset) -> Option<NaiveDate> {
    if task.is_deleted() {
        return None;
    }
    match task.status {
        TaskStatus::Done => task.completed_on(offset),
        TaskStatus::Todo => task.due_date.map(|due| due.max(today)),
        TaskStatus::Cancel => task.due_date,
    }
}

/// Display order inside one bucket.
///
/// A total order: on the same scheduled date, timed tasks come before
/// untimed ones.
#[must_use]
pub fn display_order(a: &Task, b: &Task, offset: FixedOffset) -> Ordering {
    let key = |t: &Task| {
        t.original_due_date
            .or(t.due_date)
            .unwrap_or_else(|| local_date(t.created_at, offset))
    };
    let rank = |t: &Task| (key(t), t.due_time.is_none(), t.due_time, t.created_at);
    rank(a).cmp(&rank(b)).then_with(|| a.id.cmp(&b.id))
}

/// Tasks displayed under `target`, sorted and annotated.
#[must_use]
pub fn assemble_bucket<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    target: NaiveDate,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<TimelineEntry> {
    let mut picked: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| bucket_date(t, today, offset) == Some(target))
        .collect();
    picked.sort_by(|a, b| display_order(a, b, offset));
    picked
        .into_iter()
        .map(|t| TimelineEntry::new(t.clone(), today))
        .collect()
}

/// Buckets for every date in `dates`, in one pass over `tasks`.
///
/// Every requested date is present in the result, empty or not.
#[must_use]
pub fn assemble_range<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    dates: &[NaiveDate],
    today: NaiveDate,
    offset: FixedOffset,
) -> BTreeMap<NaiveDate, Vec<TimelineEntry>> {
    let wanted: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let mut grouped: BTreeMap<NaiveDate, Vec<&Task>> =
        wanted.iter().map(|d| (*d, Vec::new())).collect();

    let mut skipped = 0usize;
    for task in tasks {
        match bucket_date(task, today, offset) {
            Some(date) => {
                if let Some(bucket) = grouped.get_mut(&date) {
                    bucket.push(task);
                }
            }
            None => skipped += 1,
        }
    }
    tracing::debug!(dates = wanted.len(), skipped, "assembled timeline range");

    grouped
        .into_iter()
        .map(|(date, mut bucket)| {
            bucket.sort_by(|a, b| display_order(a, b, offset));
            let entries = bucket
                .into_iter()
                .map(|t| TimelineEntry::new(t.clone(), today))
                .collect();
            (date, entries)
        })
        .collect()
}

/// Backlog view: every live task without a due date, oldest first.
#[must_use]
pub fn assemble_backlog<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<Task> {
    let mut backlog: Vec<Task> = tasks
        .into_iter()
        .filter(|t| !t.is_deleted() && t.is_backlog())
        .cloned()
        .collect();
    backlog.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    backlog
}
