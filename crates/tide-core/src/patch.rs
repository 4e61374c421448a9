//! Partial-update and creation inputs for tasks.
//!
//! `TaskPatch` has `Option` fields: `None` leaves the field untouched. Nullable
//! fields use `Option<Option<T>>` so that "leave as is" and "set to null" stay
//! distinct. The patch serializes with only the changed fields, which is what
//! storage implementations log and send over the wire.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::entities::Assignee;
use crate::enums::TaskStatus;
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<Option<NaiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<Assignee>>,
}

impl TaskPatch {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.group_id.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.due_time.is_none()
            && self.original_due_date.is_none()
            && self.completed_at.is_none()
            && self.assignees.is_none()
    }

    /// Reject patches that would leave the task in an invalid shape.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank title.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation("title must not be empty".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TaskPatchBuilder(TaskPatch);

impl TaskPatchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TaskPatch::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: Option<String>) -> Self {
        self.0.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn due_time(mut self, due_time: Option<NaiveTime>) -> Self {
        self.0.due_time = Some(due_time);
        self
    }

    #[must_use]
    pub fn original_due_date(mut self, original: Option<NaiveDate>) -> Self {
        self.0.original_due_date = Some(original);
        self
    }

    /// Override the automatic `completed_at` management for this patch.
    #[must_use]
    pub fn completed_at(mut self, completed_at: Option<DateTime<Utc>>) -> Self {
        self.0.completed_at = Some(completed_at);
        self
    }

    #[must_use]
    pub fn assignees(mut self, assignees: Vec<Assignee>) -> Self {
        self.0.assignees = Some(assignees);
        self
    }

    #[must_use]
    pub fn build(self) -> TaskPatch {
        self.0
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub group_id: Option<String>,
    pub created_by: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    /// User IDs to assign, in display order.
    pub assignees: Vec<String>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn at(mut self, due_time: NaiveTime) -> Self {
        self.due_time = Some(due_time);
        self
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank title, a time without a
    /// date, or a duplicated assignee.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        if self.due_time.is_some() && self.due_date.is_none() {
            return Err(CoreError::Validation(
                "due_time requires a due_date".into(),
            ));
        }
        for (idx, user) in self.assignees.iter().enumerate() {
            if self.assignees[..idx].contains(user) {
                return Err(CoreError::Validation(format!(
                    "assignee '{user}' listed twice"
                )));
            }
        }
        Ok(())
    }
}
