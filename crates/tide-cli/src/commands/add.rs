use tide_core::patch::NewTask;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AddArgs;
use crate::context::{AppContext, parse_time};
use crate::output::output;

pub async fn run(args: &AddArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let due_date = args
        .due
        .as_deref()
        .map(|due| ctx.resolve_date(due))
        .transpose()?;
    let due_time = args.at.as_deref().map(parse_time).transpose()?;

    let input = NewTask {
        description: args.description.clone(),
        group_id: args.group.clone(),
        due_date,
        due_time,
        assignees: args.assignees.clone(),
        ..NewTask::new(args.title.as_str())
    };
    let task = ctx.engine.create_task(input).await?;
    tracing::info!(task_id = %task.id, "task created");
    output(&task, flags.format)
}
