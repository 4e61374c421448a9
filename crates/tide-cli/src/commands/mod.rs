pub mod add;
pub mod config;
pub mod delete;
pub mod schedule;
pub mod status;
pub mod view;

use tide_core::enums::TaskStatus;

use crate::cli::{Commands, GlobalFlags};
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Add(args) => add::run(&args, ctx, flags).await,
        Commands::Done(task) => status::complete(&task, true, ctx, flags).await,
        Commands::Undo(task) => status::complete(&task, false, ctx, flags).await,
        Commands::Cancel { id } => status::set(&id, TaskStatus::Cancel, ctx, flags).await,
        Commands::Restore { id } => status::set(&id, TaskStatus::Todo, ctx, flags).await,
        Commands::Move(args) => schedule::reschedule(&args, ctx, flags).await,
        Commands::BacklogMove { id } => schedule::to_backlog(&id, ctx, flags).await,
        Commands::Delete { id } => delete::run(&id, ctx, flags).await,
        Commands::Today => view::today(ctx, flags).await,
        Commands::Day { date } => view::day(&date, ctx, flags).await,
        Commands::Week { date } => view::week(date.as_deref(), ctx, flags).await,
        Commands::Backlog => view::backlog(ctx, flags).await,
        Commands::Config => config::run(&ctx.config, flags),
    }
}
