//! # tide-core
//!
//! Core types shared by every Tide crate:
//! - Task and assignee entities
//! - `TaskStatus` with its transition state machine
//! - Patch and creation inputs plus the rules that apply them
//! - Calendar-date helpers and the injectable clock
//! - ID prefixes (server and temporary) and cross-cutting errors

pub mod calendar;
pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod mutation;
pub mod patch;
pub mod transition;
