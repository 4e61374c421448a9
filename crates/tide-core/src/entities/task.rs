use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar::local_date;
use crate::entities::Assignee;
use crate::enums::TaskStatus;

/// A task on the personal or group timeline.
///
/// `due_date == None` places the task in the backlog. `original_due_date` is
/// the date the task was first scheduled and drives rollover; reschedules never
/// touch it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub group_id: Option<String>,
    pub created_by: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub original_due_date: Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

impl Task {
    /// Soft-deleted tasks are invisible to every read path.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[must_use]
    pub const fn is_backlog(&self) -> bool {
        self.due_date.is_none()
    }

    /// Calendar date of completion in the given local offset.
    #[must_use]
    pub fn completed_on(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.completed_at.map(|ts| local_date(ts, offset))
    }

    #[must_use]
    pub fn assignee(&self, user_id: &str) -> Option<&Assignee> {
        self.assignees.iter().find(|a| a.user_id == user_id)
    }
}
