//! Overdue ("rollover") annotation.
//!
//! Rollover is computed from `original_due_date`, not `due_date`, so
//! postponing a task does not reset how overdue it is. The result is a
//! display annotation and is never written back to the task.

use chrono::NaiveDate;
use serde::Serialize;
use tide_core::calendar::day_difference;
use tide_core::entities::Task;
use tide_core::enums::TaskStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rollover {
    pub is_overdue: bool,
    pub days_overdue: i64,
}

/// Compute the rollover annotation of `task` as of `today`.
///
/// Only TODO tasks with an `original_due_date` can be overdue; everything
/// else, including malformed tasks, gets the zero annotation.
#[must_use]
pub fn compute_rollover(task: &Task, today: NaiveDate) -> Rollover {
    if task.status != TaskStatus::Todo {
        return Rollover::default();
    }
    let Some(original) = task.original_due_date else {
        return Rollover::default();
    };
    let days = day_difference(today, original);
    if days <= 0 {
        return Rollover::default();
    }
    Rollover {
        is_overdue: true,
        days_overdue: days,
    }
}

/// A task together with its rollover annotation, as handed to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub task: Task,
    #[serde(flatten)]
    pub rollover: Rollover,
}

impl TimelineEntry {
    #[must_use]
    pub fn new(task: Task, today: NaiveDate) -> Self {
        let rollover = compute_rollover(&task, today);
        Self { task, rollover }
    }
}

/// Annotate a batch of tasks without touching the inputs.
#[must_use]
pub fn annotate<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
) -> Vec<TimelineEntry> {
    tasks
        .into_iter()
        .map(|task| TimelineEntry::new(task.clone(), today))
        .collect()
}
