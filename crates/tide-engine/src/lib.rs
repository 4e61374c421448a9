//! # tide-engine
//!
//! Timeline assembly and optimistic synchronization for Tide.
//!
//! Read path: [`window::load_window`] pulls the active, due-range, and
//! completion-range windows from a [`store::TaskSource`];
//! [`merge::TaskCollection`] unions them; [`rollover`] annotates overdue
//! tasks; [`bucket`] partitions the collection per calendar date.
//!
//! Write path: [`engine::TimelineEngine`] applies each mutation to its local
//! collection immediately, issues the remote write through a
//! [`store::TaskSink`], and then either merges the server's answer or rolls
//! the change back.
//!
//! [`memory::MemoryStore`] is an in-process implementation of the storage
//! contract for hosts without a database and for tests.

pub mod bucket;
pub mod engine;
pub mod error;
pub mod memory;
pub mod merge;
pub mod rollover;
pub mod store;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::TimelineEngine;
pub use error::EngineError;
pub use merge::TaskCollection;
pub use store::{StoreError, TaskSink, TaskSource, TaskStore};
