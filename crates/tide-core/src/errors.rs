//! Cross-cutting error types for Tide.
//!
//! Storage and engine errors are defined in their own crates; this enum
//! covers failures that can be detected from the model alone.

use thiserror::Error;

use crate::transition::TransitionError;

/// Errors raised by model-level validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// A status transition was rejected by the state machine.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// Input failed validation (empty title, malformed field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
