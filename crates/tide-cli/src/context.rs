use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveTime};
use tide_config::TideConfig;
use tide_core::clock::{Clock, SystemClock};
use tide_core::entities::Task;
use tide_db::TaskDb;
use tide_db::error::DatabaseError;
use tide_engine::TimelineEngine;
use tide_engine::window::{LoadReport, TimelineWindow};

use crate::cli::GlobalFlags;

/// Everything a command needs: configuration and a session engine over the
/// configured database.
pub struct AppContext {
    pub config: TideConfig,
    pub engine: TimelineEngine<TaskDb>,
}

impl AppContext {
    pub async fn init(config: TideConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let db = open_database(&config, flags).await?;
        let clock: Arc<dyn Clock> = Arc::new(
            config
                .timeline
                .fixed_offset()
                .map_or_else(SystemClock::new, SystemClock::with_offset),
        );
        let engine = TimelineEngine::new(Arc::new(db), clock);
        Ok(Self { config, engine })
    }

    pub fn today(&self) -> NaiveDate {
        self.engine.today()
    }

    /// Load the configured window around today.
    pub async fn load_around_today(&self) -> LoadReport {
        let window = TimelineWindow::around(self.today(), self.config.timeline.window_days);
        self.engine.refresh(window).await
    }

    /// Make sure `id` is in the session, looking it up directly if no window
    /// load brought it in.
    pub async fn track(&self, id: &str) -> anyhow::Result<Task> {
        if let Some(task) = self.engine.get(id) {
            return Ok(task);
        }
        let task = match self.engine.store().get_task(id).await {
            Ok(task) => task,
            Err(DatabaseError::NoResult) => anyhow::bail!("task not found: {id}"),
            Err(error) => return Err(error).with_context(|| format!("failed to load task {id}")),
        };
        self.engine.adopt(vec![task.clone()]);
        Ok(task)
    }

    /// Resolve a user-supplied day relative to today.
    pub fn resolve_date(&self, input: &str) -> anyhow::Result<NaiveDate> {
        resolve_date(input, self.today())
    }
}

async fn open_database(config: &TideConfig, flags: &GlobalFlags) -> anyhow::Result<TaskDb> {
    if let Some(path) = &flags.db {
        return TaskDb::open_local(path)
            .await
            .with_context(|| format!("failed to open database at {path}"));
    }
    if config.database.is_remote() {
        return TaskDb::open_remote(&config.database.url, &config.database.auth_token)
            .await
            .with_context(|| format!("failed to connect to {}", config.database.url));
    }
    TaskDb::open_local(&config.database.path)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))
}

/// One line for stderr when a load came back incomplete.
pub fn degraded_note(report: &LoadReport) -> Option<String> {
    if !report.is_degraded() {
        return None;
    }
    let kinds: Vec<&str> = report.failed.iter().map(|f| f.kind.as_str()).collect();
    Some(format!(
        "tide: showing partial results; failed to load: {}",
        kinds.join(", ")
    ))
}

/// Print [`degraded_note`] for `report`, if any.
pub fn note_degraded(report: &LoadReport) {
    if let Some(note) = degraded_note(report) {
        eprintln!("{note}");
    }
}

/// `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday`, or a signed day count
/// such as `+3` or `-1`.
pub fn resolve_date(input: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }
    if input.starts_with(['+', '-']) {
        let days: i64 = input
            .parse()
            .with_context(|| format!("invalid day offset '{input}'"))?;
        return today
            .checked_add_signed(Duration::days(days))
            .with_context(|| format!("day offset '{input}' is out of range"));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{input}', expected YYYY-MM-DD"))
}

/// `HH:MM` or `HH:MM:SS`.
pub fn parse_time(input: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .with_context(|| format!("invalid time '{input}', expected HH:MM"))
}
