//! Field rules applied whenever a task is created or patched.
//!
//! The same functions run in two places: inside storage implementations (the
//! authoritative write) and inside the optimistic apply of `tide-engine`, so a
//! local guess and the server's answer agree on every derived field the client
//! can compute.
//!
//! Rules:
//! - entering `DONE` stamps `completed_at = now`, leaving `DONE` clears it,
//!   unless the patch sets `completed_at` explicitly;
//! - the first move out of the backlog captures `original_due_date`;
//!   rescheduling an already-dated task never touches it;
//! - setting `due_date` to null is an explicit move to the backlog and wipes
//!   `original_due_date` and `due_time`;
//! - `due_time` is meaningless without a `due_date` and is cleared with it.

use chrono::{DateTime, Utc};

use crate::entities::{Assignee, Task};
use crate::enums::TaskStatus;
use crate::patch::{NewTask, TaskPatch};

/// Build a freshly created task from creation input.
#[must_use]
pub fn build_task(id: String, input: &NewTask, now: DateTime<Utc>) -> Task {
    Task {
        id,
        title: input.title.trim().to_string(),
        description: input.description.clone(),
        group_id: input.group_id.clone(),
        created_by: input.created_by.clone(),
        status: TaskStatus::Todo,
        due_date: input.due_date,
        due_time: input.due_date.and(input.due_time),
        original_due_date: input.due_date,
        completed_at: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        assignees: input.assignees.iter().map(Assignee::pending).collect(),
    }
}

/// Apply `patch` to `task` at instant `now`, returning the new state.
///
/// Transition legality is not checked here; callers validate first with
/// `crate::transition::validate`.
#[must_use]
pub fn apply_patch(task: &Task, patch: &TaskPatch, now: DateTime<Utc>) -> Task {
    let mut next = task.clone();

    if let Some(title) = &patch.title {
        next.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        next.description.clone_from(description);
    }
    if let Some(group_id) = &patch.group_id {
        next.group_id.clone_from(group_id);
    }

    if let Some(due_date) = patch.due_date {
        next.due_date = due_date;
        match due_date {
            None => {
                next.original_due_date = None;
                next.due_time = None;
            }
            Some(date) if task.due_date.is_none() => {
                next.original_due_date = Some(date);
            }
            Some(_) => {}
        }
    }
    if let Some(due_time) = patch.due_time {
        next.due_time = due_time;
    }
    if next.due_date.is_none() {
        next.due_time = None;
    }
    if let Some(original) = patch.original_due_date {
        next.original_due_date = original;
    }

    if let Some(status) = patch.status {
        if status != task.status {
            next.status = status;
            if status == TaskStatus::Done {
                next.completed_at = Some(now);
            } else if task.status == TaskStatus::Done {
                next.completed_at = None;
            }
        }
    }
    if let Some(completed_at) = patch.completed_at {
        next.completed_at = completed_at;
    }

    if let Some(assignees) = &patch.assignees {
        next.assignees.clone_from(assignees);
    }

    next.updated_at = now;
    next
}

/// Set one assignee's completion flag, stamping or clearing its timestamp.
///
/// Returns `None` when `user_id` is not assigned to the task.
#[must_use]
pub fn with_assignee_completion(
    task: &Task,
    user_id: &str,
    completed: bool,
    now: DateTime<Utc>,
) -> Option<Vec<Assignee>> {
    task.assignee(user_id)?;
    Some(
        task.assignees
            .iter()
            .map(|a| {
                if a.user_id == user_id {
                    Assignee {
                        user_id: a.user_id.clone(),
                        is_completed: completed,
                        completed_at: completed.then_some(now),
                    }
                } else {
                    a.clone()
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::TaskPatchBuilder;
    use crate::transition::plan_status_change;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn base(now: DateTime<Utc>) -> Task {
        build_task("tsk-00000001".into(), &NewTask::new("Write report"), now)
    }

    #[test]
    fn build_captures_original_due_date() {
        let now = ts("2024-01-01T08:00:00Z");
        let input = NewTask {
            assignees: vec!["u1".into(), "u2".into()],
            ..NewTask::new("  Plan sprint ").due(date("2024-01-03"))
        };
        let task = build_task("tsk-1".into(), &input, now);
        assert_eq!(task.title, "Plan sprint");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.original_due_date, Some(date("2024-01-03")));
        assert_eq!(task.assignees.len(), 2);
        assert!(task.assignees.iter().all(|a| !a.is_completed));
    }

    #[test]
    fn done_stamps_completed_at() {
        let created = ts("2024-01-01T08:00:00Z");
        let now = ts("2024-01-02T09:30:00Z");
        let patch = TaskPatchBuilder::new().status(TaskStatus::Done).build();
        let done = apply_patch(&base(created), &patch, now);
        assert_eq!(done.completed_at, Some(now));
        assert_eq!(done.updated_at, now);
    }

    #[test]
    fn leaving_done_clears_completed_at() {
        let now = ts("2024-01-02T09:30:00Z");
        let done = apply_patch(
            &base(now),
            &TaskPatchBuilder::new().status(TaskStatus::Done).build(),
            now,
        );
        let reopened = apply_patch(
            &done,
            &TaskPatchBuilder::new().status(TaskStatus::Todo).build(),
            now,
        );
        assert_eq!(reopened.completed_at, None);
    }

    #[test]
    fn explicit_completed_at_wins() {
        let now = ts("2024-01-02T09:30:00Z");
        let backdated = ts("2023-12-31T18:00:00Z");
        let patch = TaskPatchBuilder::new()
            .status(TaskStatus::Done)
            .completed_at(Some(backdated))
            .build();
        let done = apply_patch(&base(now), &patch, now);
        assert_eq!(done.completed_at, Some(backdated));
    }

    #[test]
    fn reschedule_keeps_original_due_date() {
        let now = ts("2024-01-01T08:00:00Z");
        let scheduled = apply_patch(
            &base(now),
            &TaskPatchBuilder::new().due_date(Some(date("2024-01-02"))).build(),
            now,
        );
        assert_eq!(scheduled.original_due_date, Some(date("2024-01-02")));

        let postponed = apply_patch(
            &scheduled,
            &TaskPatchBuilder::new().due_date(Some(date("2024-01-09"))).build(),
            now,
        );
        assert_eq!(postponed.due_date, Some(date("2024-01-09")));
        assert_eq!(postponed.original_due_date, Some(date("2024-01-02")));
    }

    #[test]
    fn move_to_backlog_wipes_schedule() {
        let now = ts("2024-01-01T08:00:00Z");
        let input = NewTask::new("Call mom")
            .due(date("2024-01-02"))
            .at(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        let task = build_task("tsk-1".into(), &input, now);

        let backlog = apply_patch(&task, &TaskPatchBuilder::new().due_date(None).build(), now);
        assert_eq!(backlog.due_date, None);
        assert_eq!(backlog.due_time, None);
        assert_eq!(backlog.original_due_date, None);

        let rescheduled = apply_patch(
            &backlog,
            &TaskPatchBuilder::new().due_date(Some(date("2024-01-05"))).build(),
            now,
        );
        assert_eq!(rescheduled.original_due_date, Some(date("2024-01-05")));
    }

    #[test]
    fn backlog_uncheck_scenario() {
        let completed = ts("2024-01-05T10:00:00Z");
        let now = Utc.with_ymd_and_hms(2024, 1, 6, 9, 0, 0).unwrap();
        let done = Task {
            status: TaskStatus::Done,
            completed_at: Some(completed),
            ..base(completed)
        };

        let patch = plan_status_change(&done, TaskStatus::Todo, date("2024-01-06")).unwrap();
        let reopened = apply_patch(&done, &patch, now);

        assert_eq!(reopened.status, TaskStatus::Todo);
        assert_eq!(reopened.due_date, Some(date("2024-01-06")));
        assert_eq!(reopened.original_due_date, Some(date("2024-01-06")));
        assert_eq!(reopened.completed_at, None);
    }

    #[test]
    fn assignee_completion_updates_in_place() {
        let now = ts("2024-01-01T08:00:00Z");
        let input = NewTask {
            assignees: vec!["a".into(), "b".into(), "c".into()],
            ..NewTask::new("Group chore")
        };
        let task = build_task("tsk-1".into(), &input, now);

        let assignees = with_assignee_completion(&task, "b", true, now).unwrap();
        let order: Vec<_> = assignees.iter().map(|a| a.user_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(assignees[1].is_completed);
        assert_eq!(assignees[1].completed_at, Some(now));

        assert!(with_assignee_completion(&task, "zed", true, now).is_none());
    }
}
