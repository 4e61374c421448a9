//! Repository methods on [`crate::TaskDb`].

pub mod assignee;
pub mod task;
