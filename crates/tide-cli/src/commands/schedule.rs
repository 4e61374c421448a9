use crate::cli::GlobalFlags;
use crate::cli::root_commands::MoveArgs;
use crate::context::{AppContext, parse_time};
use crate::output::output;

/// Move a task to another day. Without `--at` the current due time is kept.
pub async fn reschedule(
    args: &MoveArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let current = ctx.track(&args.id).await?;
    let date = ctx.resolve_date(&args.date)?;
    let time = match args.at.as_deref() {
        Some(at) => Some(parse_time(at)?),
        None => current.due_time,
    };
    let updated = ctx.engine.reschedule(&args.id, date, time).await?;
    output(&updated, flags.format)
}

pub async fn to_backlog(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.track(id).await?;
    let updated = ctx.engine.move_to_backlog(id).await?;
    output(&updated, flags.format)
}
