use tide_core::enums::TaskStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::TaskRef;
use crate::context::AppContext;
use crate::output::output;

/// `done` / `undo`: the task's status, or one assignee's completion.
pub async fn complete(
    task: &TaskRef,
    completed: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.track(&task.id).await?;
    let updated = match &task.user {
        Some(user) => {
            ctx.engine
                .set_assignee_completed(&task.id, user, completed)
                .await?
        }
        None => {
            let target = if completed {
                TaskStatus::Done
            } else {
                TaskStatus::Todo
            };
            ctx.engine.set_status(&task.id, target).await?
        }
    };
    output(&updated, flags.format)
}

pub async fn set(
    id: &str,
    target: TaskStatus,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.track(id).await?;
    let updated = ctx.engine.set_status(id, target).await?;
    output(&updated, flags.format)
}
