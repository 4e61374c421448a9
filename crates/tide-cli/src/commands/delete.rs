use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;
use crate::output::text::Deleted;

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.track(id).await?;
    ctx.engine.delete_task(id).await?;
    output(
        &Deleted {
            id: id.to_string(),
            deleted: true,
        },
        flags.format,
    )
}
