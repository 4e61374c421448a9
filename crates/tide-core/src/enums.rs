//! Status and mutation enums for Tide.
//!
//! `TaskStatus` serializes in upper case (`"TODO"`, `"DONE"`, `"CANCEL"`), which
//! is also the representation stored by `tide-db`. The state machine lives on
//! the enum via `allowed_next_states()`; `crate::transition` layers the
//! user-facing validation on top.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Status of a task.
///
/// ```text
/// TODO → DONE   → TODO (unchecked)
///      → CANCEL → TODO (restored)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Todo,
    Done,
    Cancel,
}

impl TaskStatus {
    pub const ALL: [Self; 3] = [Self::Todo, Self::Done, Self::Cancel];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Todo => &[Self::Done, Self::Cancel],
            Self::Done | Self::Cancel => &[Self::Todo],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Done => "DONE",
            Self::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MutationKind
// ---------------------------------------------------------------------------

/// Kind of remote write issued for an optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(status_todo, TaskStatus, TaskStatus::Todo, "TODO");
    test_serde_roundtrip!(status_done, TaskStatus, TaskStatus::Done, "DONE");
    test_serde_roundtrip!(status_cancel, TaskStatus, TaskStatus::Cancel, "CANCEL");
    test_serde_roundtrip!(kind_create, MutationKind, MutationKind::Create, "create");
    test_serde_roundtrip!(kind_delete, MutationKind, MutationKind::Delete, "delete");

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<TaskStatus>("\"IN_PROGRESS\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn todo_reaches_both_terminal_states() {
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::Cancel));
    }

    #[test]
    fn terminal_states_only_return_to_todo() {
        assert_eq!(TaskStatus::Done.allowed_next_states(), &[TaskStatus::Todo]);
        assert_eq!(TaskStatus::Cancel.allowed_next_states(), &[TaskStatus::Todo]);
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Cancel));
        assert!(!TaskStatus::Cancel.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn no_self_transitions() {
        for status in TaskStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", TaskStatus::Cancel), "CANCEL");
        assert_eq!(format!("{}", MutationKind::Update), "update");
    }
}
