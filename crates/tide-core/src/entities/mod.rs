//! Entity structs for Tide domain objects.
//!
//! Each entity maps to a table in the libSQL database (`tasks`,
//! `task_assignees`). All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod assignee;
mod task;

pub use assignee::Assignee;
pub use task::Task;
