use thiserror::Error;
use tide_core::enums::MutationKind;
use tide_core::errors::CoreError;
use tide_core::transition::TransitionError;

use crate::store::StoreError;

/// Errors returned by [`crate::TimelineEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input rejected before anything was applied.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal status change, rejected before anything was applied.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// The task is still being created and has no server id yet.
    #[error("Task {id} is still being created; try again once it is saved")]
    PendingCreate { id: String },

    /// The remote write failed and the optimistic change was rolled back.
    #[error("Failed to {kind} task {id}; the change was rolled back")]
    RemoteWrite {
        kind: MutationKind,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Core(CoreError),
}

impl EngineError {
    /// True when the error means a local change was undone.
    #[must_use]
    pub const fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RemoteWrite { .. })
    }
}

impl From<CoreError> for EngineError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::InvalidTransition(transition) => Self::Transition(transition),
            CoreError::NotFound { id } => Self::NotFound { id },
            other @ CoreError::Other(_) => Self::Core(other),
        }
    }
}
