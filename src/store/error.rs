//! Error types surfaced by store operations.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A patch could not be merged into the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MergeError {
    message: String,
}

impl MergeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected. State is unchanged and no listener was notified.
    #[error("invalid patch: {0}")]
    InvalidPatch(#[source] BoxError),

    #[error("selector failed: {0}")]
    Selector(#[source] BoxError),

    /// Listeners panicked during a notification pass. The new state was
    /// committed before the pass started.
    #[error("{failed} of {total} listeners panicked during notification")]
    Listener { failed: usize, total: usize },
}

impl StoreError {
    pub fn is_invalid_patch(&self) -> bool {
        matches!(self, StoreError::InvalidPatch(_))
    }
}

impl From<MergeError> for StoreError {
    fn from(err: MergeError) -> Self {
        StoreError::InvalidPatch(Box::new(err))
    }
}
