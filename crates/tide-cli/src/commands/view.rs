use tide_engine::window::TimelineWindow;

use crate::cli::GlobalFlags;
use crate::context::{AppContext, note_degraded};
use crate::output::output;
use crate::output::text::DayView;

pub async fn today(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    note_degraded(&ctx.load_around_today().await);
    let date = ctx.today();
    output(
        &DayView {
            date,
            entries: ctx.engine.day(date),
        },
        flags.format,
    )
}

/// Any day. Past days come from the completion and due-date windows; today
/// additionally collects every overdue task.
pub async fn day(input: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let date = ctx.resolve_date(input)?;
    note_degraded(&ctx.engine.refresh(TimelineWindow::single(date)).await);
    output(
        &DayView {
            date,
            entries: ctx.engine.day(date),
        },
        flags.format,
    )
}

pub async fn week(
    input: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let anchor = input.map_or_else(|| Ok(ctx.today()), |d| ctx.resolve_date(d))?;
    let week_start = ctx.config.timeline.week_starts_on;
    let report = ctx
        .engine
        .refresh(TimelineWindow::week_of(anchor, week_start))
        .await;
    note_degraded(&report);
    let days: Vec<DayView> = ctx
        .engine
        .week(anchor, week_start)
        .into_iter()
        .map(|(date, entries)| DayView { date, entries })
        .collect();
    output(&days, flags.format)
}

pub async fn backlog(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    note_degraded(&ctx.engine.refresh_backlog().await);
    output(&ctx.engine.backlog(), flags.format)
}
