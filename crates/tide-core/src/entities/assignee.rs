use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A user assigned to a group task, with their own completion flag.
///
/// The position of an assignee inside `Task::assignees` is shown to users and
/// is preserved across merges.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assignee {
    pub user_id: String,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Assignee {
    #[must_use]
    pub fn pending(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_completed: false,
            completed_at: None,
        }
    }
}
