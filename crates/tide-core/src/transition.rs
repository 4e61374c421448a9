//! Status transition validation and planning.
//!
//! [`validate`] is the user-facing face of `TaskStatus::allowed_next_states`:
//! every rejection carries a distinct reason, and the direct DONE↔CANCEL case
//! tells the user to restore the task to TODO first.
//!
//! [`plan_status_change`] turns a validated transition into a [`TaskPatch`],
//! adding the cross-field rule for unchecking a backlog task.

use chrono::NaiveDate;
use thiserror::Error;

use crate::entities::Task;
use crate::enums::TaskStatus;
use crate::patch::{TaskPatch, TaskPatchBuilder};

/// Why a status transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The task already has the requested status.
    #[error("Task is already {status}")]
    SameState { status: TaskStatus },

    /// DONE → CANCEL or CANCEL → DONE attempted without passing through TODO.
    #[error("Cannot change a {from} task to {to} directly; restore it to TODO first")]
    RestoreRequired { from: TaskStatus, to: TaskStatus },

    /// Any other edge missing from the state machine.
    #[error("No transition from {from} to {to}")]
    NotAllowed { from: TaskStatus, to: TaskStatus },
}

/// Check whether `current → target` is a legal transition.
///
/// # Errors
///
/// Returns the specific [`TransitionError`] describing the rejection.
pub fn validate(current: TaskStatus, target: TaskStatus) -> Result<(), TransitionError> {
    if current == target {
        return Err(TransitionError::SameState { status: current });
    }
    if current.can_transition_to(target) {
        return Ok(());
    }
    match (current, target) {
        (TaskStatus::Done, TaskStatus::Cancel) | (TaskStatus::Cancel, TaskStatus::Done) => {
            Err(TransitionError::RestoreRequired {
                from: current,
                to: target,
            })
        }
        _ => Err(TransitionError::NotAllowed {
            from: current,
            to: target,
        }),
    }
}

/// Build the patch for moving `task` to `target` on `today`.
///
/// A backlog task (no due date) that goes from DONE back to TODO becomes
/// today's task: both `due_date` and `original_due_date` are set to `today`.
/// `completed_at` is left to `crate::mutation::apply_patch`.
///
/// # Errors
///
/// Returns a [`TransitionError`] when the transition is illegal.
pub fn plan_status_change(
    task: &Task,
    target: TaskStatus,
    today: NaiveDate,
) -> Result<TaskPatch, TransitionError> {
    validate(task.status, target)?;

    let mut builder = TaskPatchBuilder::new().status(target);
    if task.status == TaskStatus::Done && target == TaskStatus::Todo && task.due_date.is_none() {
        builder = builder
            .due_date(Some(today))
            .original_due_date(Some(today));
    }
    Ok(builder.build())
}
