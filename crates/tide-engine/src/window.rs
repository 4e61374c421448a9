//! Date windows and the three-query window load.
//!
//! A window load always runs all three fetch predicates concurrently and
//! returns their batches in a fixed order: active first, then due range,
//! then completion range. Active comes first so that an old task that is
//! still open is never shadowed by a stale windowed copy.

use std::fmt;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use tide_core::calendar::{WeekStart, dates_between, day_end, day_start, shift_days};
use tide_core::entities::Task;

use crate::store::{StoreError, TaskSource};

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimelineWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineWindow {
    /// A window from `start` to `end`; the bounds are swapped if reversed.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// `days` before and after `today`.
    #[must_use]
    pub fn around(today: NaiveDate, days: u32) -> Self {
        let days = i64::from(days);
        Self::new(shift_days(today, -days), shift_days(today, days))
    }

    /// The seven days of the week containing `date`.
    #[must_use]
    pub fn week_of(date: NaiveDate, week_start: WeekStart) -> Self {
        let start = week_start.week_containing(date);
        Self::new(start, shift_days(start, 6))
    }

    #[must_use]
    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        dates_between(self.start, self.end)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for TimelineWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Active,
    DueRange,
    CompletionRange,
    Backlog,
}

impl FetchKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::DueRange => "due_range",
            Self::CompletionRange => "completion_range",
            Self::Backlog => "backlog",
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FetchKind,
    pub message: String,
}

/// Outcome of a load. A failed fetch only removes its own contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub window: Option<TimelineWindow>,
    pub fetched: usize,
    pub failed: Vec<FetchFailure>,
}

impl LoadReport {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Batches from one load, in merge order.
#[derive(Debug, Default)]
pub struct WindowBatches {
    pub batches: Vec<Vec<Task>>,
    pub failed: Vec<FetchFailure>,
}

impl WindowBatches {
    fn record(&mut self, kind: FetchKind, result: Result<Vec<Task>, StoreError>) {
        match result {
            Ok(tasks) => {
                tracing::debug!(kind = %kind, count = tasks.len(), "fetched tasks");
                self.batches.push(tasks);
            }
            Err(error) => {
                tracing::warn!(kind = %kind, %error, "fetch failed; continuing without it");
                self.failed.push(FetchFailure {
                    kind,
                    message: error.to_string(),
                });
            }
        }
    }

    #[must_use]
    pub fn fetched(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn into_report(self, window: Option<TimelineWindow>) -> (Vec<Vec<Task>>, LoadReport) {
        let report = LoadReport {
            window,
            fetched: self.fetched(),
            failed: self.failed,
        };
        (self.batches, report)
    }
}

/// Run the active, due-range, and completion-range fetches for `window`.
///
/// `today` bounds the active query; the completion range covers local
/// midnight of `window.start` to the end of `window.end` in `offset`.
pub async fn load_window<S>(
    source: &S,
    window: TimelineWindow,
    today: NaiveDate,
    offset: FixedOffset,
) -> WindowBatches
where
    S: TaskSource + ?Sized,
{
    let (active, due, completed) = tokio::join!(
        source.fetch_active(today),
        source.fetch_by_due_range(window.start, window.end),
        source.fetch_by_completion_range(
            day_start(window.start, offset),
            day_end(window.end, offset)
        ),
    );

    let mut out = WindowBatches::default();
    out.record(FetchKind::Active, active);
    out.record(FetchKind::DueRange, due);
    out.record(FetchKind::CompletionRange, completed);
    out
}

/// Fetch the backlog as a single batch.
pub async fn load_backlog<S>(source: &S) -> WindowBatches
where
    S: TaskSource + ?Sized,
{
    let mut out = WindowBatches::default();
    out.record(FetchKind::Backlog, source.fetch_backlog().await);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::test_support::{date, seeded, utc};
    use pretty_assertions::assert_eq;
    use tide_core::enums::TaskStatus;

    #[test]
    fn around_is_symmetric() {
        let w = TimelineWindow::around(date("2024-01-10"), 7);
        assert_eq!(w.start, date("2024-01-03"));
        assert_eq!(w.end, date("2024-01-17"));
        assert_eq!(w.dates().len(), 15);
    }

    #[test]
    fn week_of_respects_week_start() {
        let monday = TimelineWindow::week_of(date("2024-01-10"), WeekStart::Monday);
        assert_eq!(monday.to_string(), "2024-01-08..2024-01-14");
        let sunday = TimelineWindow::week_of(date("2024-01-10"), WeekStart::Sunday);
        assert_eq!(sunday.to_string(), "2024-01-07..2024-01-13");
    }

    #[test]
    fn reversed_bounds_are_normalised() {
        let w = TimelineWindow::new(date("2024-01-10"), date("2024-01-01"));
        assert_eq!(w.start, date("2024-01-01"));
        assert!(w.contains(date("2024-01-05")));
    }

    #[tokio::test]
    async fn load_keeps_old_overdue_task() {
        let store = MemoryStore::new(crate::test_support::clock("2024-01-10"));
        seeded(&store, "tsk-old", TaskStatus::Todo, Some("2023-06-01"));
        seeded(&store, "tsk-near", TaskStatus::Todo, Some("2024-01-12"));
        seeded(&store, "tsk-far", TaskStatus::Todo, Some("2024-03-01"));

        let window = TimelineWindow::around(date("2024-01-10"), 3);
        let batches = load_window(&store, window, date("2024-01-10"), utc()).await;
        let ids: Vec<_> = batches
            .batches
            .iter()
            .flatten()
            .map(|t| t.id.as_str())
            .collect();

        assert_eq!(batches.batches.len(), 3);
        assert!(ids.contains(&"tsk-old"));
        assert!(ids.contains(&"tsk-near"));
        assert!(!ids.contains(&"tsk-far"));
    }

    #[tokio::test]
    async fn failed_fetch_degrades_instead_of_failing() {
        let store = MemoryStore::new(crate::test_support::clock("2024-01-10"));
        seeded(&store, "tsk-old", TaskStatus::Todo, Some("2023-06-01"));
        store.fail_fetch(FetchKind::DueRange);

        let window = TimelineWindow::around(date("2024-01-10"), 3);
        let batches = load_window(&store, window, date("2024-01-10"), utc()).await;
        let (batches, report) = batches.into_report(Some(window));

        assert_eq!(batches.len(), 2);
        assert!(report.is_degraded());
        assert_eq!(report.failed[0].kind, FetchKind::DueRange);
        assert_eq!(report.fetched, 1);
    }
}
