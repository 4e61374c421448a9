//! ID prefixes and temporary-ID helpers.
//!
//! Server-assigned task IDs look like `tsk-a3f8b2c1`. Optimistically created
//! tasks carry a temporary `tmp-` ID until the server responds; the prefixes
//! never overlap, so a temporary ID can always be told apart.

pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_TEMP: &str = "tmp";

/// Format a temporary ID from a per-session sequence number.
#[must_use]
pub fn temporary_id(seq: u64) -> String {
    format!("{PREFIX_TEMP}-{seq:08x}")
}

/// Whether `id` was minted locally and has not been confirmed by the server.
#[must_use]
pub fn is_temporary(id: &str) -> bool {
    id.strip_prefix(PREFIX_TEMP)
        .is_some_and(|rest| rest.starts_with('-'))
}
