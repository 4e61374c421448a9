//! Plain-text rendering for terminals.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;
use tide_config::TideConfig;
use tide_core::entities::Task;
use tide_core::enums::TaskStatus;
use tide_engine::rollover::TimelineEntry;

/// Human-readable rendering, used by `--format text`.
pub trait TextView {
    fn to_text(&self) -> String;
}

/// One day's bucket.
#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub entries: Vec<TimelineEntry>,
}

/// Acknowledgement for a delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

const fn checkbox(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::Done => "[x]",
        TaskStatus::Cancel => "[-]",
    }
}

fn task_line(task: &Task) -> String {
    let mut line = format!("{} {}", checkbox(task.status), task.title);
    if let Some(time) = task.due_time {
        let _ = write!(line, " @ {}", time.format("%H:%M"));
    }
    if !task.assignees.is_empty() {
        let people: Vec<String> = task
            .assignees
            .iter()
            .map(|a| {
                if a.is_completed {
                    format!("{}✓", a.user_id)
                } else {
                    a.user_id.clone()
                }
            })
            .collect();
        let _ = write!(line, " ({})", people.join(", "));
    }
    line
}

impl TextView for Task {
    fn to_text(&self) -> String {
        let mut out = format!("{}  {}", task_line(self), self.id);
        match self.due_date {
            Some(due) => {
                let _ = write!(out, "\n  due {due}");
            }
            None => out.push_str("\n  backlog"),
        }
        if let Some(description) = &self.description {
            let _ = write!(out, "\n  {description}");
        }
        out
    }
}

impl TextView for TimelineEntry {
    fn to_text(&self) -> String {
        let mut line = task_line(&self.task);
        if self.rollover.is_overdue {
            let _ = write!(line, "  overdue {}d", self.rollover.days_overdue);
        }
        let _ = write!(line, "  {}", self.task.id);
        line
    }
}

impl TextView for DayView {
    fn to_text(&self) -> String {
        let mut out = self.date.format("%Y-%m-%d (%a)").to_string();
        if self.entries.is_empty() {
            out.push_str("\n  (nothing)");
        }
        for entry in &self.entries {
            let _ = write!(out, "\n  {}", entry.to_text());
        }
        out
    }
}

impl<T: TextView> TextView for Vec<T> {
    fn to_text(&self) -> String {
        if self.is_empty() {
            return String::from("(nothing)");
        }
        self.iter()
            .map(TextView::to_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TextView for Deleted {
    fn to_text(&self) -> String {
        format!("deleted {}", self.id)
    }
}

impl TextView for TideConfig {
    fn to_text(&self) -> String {
        toml::to_string_pretty(self)
            .unwrap_or_else(|error| format!("<unprintable config: {error}>"))
    }
}
