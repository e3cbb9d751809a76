//! Error types for the task queue.

use std::time::Duration;

use scoreboard_store::StoreError;
use thiserror::Error;

/// Errors a queued task, or the queue itself, can resolve with.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("employee {0} has already submitted a score")]
    DuplicateUser(String),

    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),

    #[error("stored leaderboard is corrupt: {0}")]
    CorruptStore(#[source] StoreError),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("task queue is shutting down")]
    ShuttingDown,

    #[error("task queue worker stopped without replying")]
    WorkerGone,

    #[error("task queue did not drain within {0:?}")]
    DrainTimeout(Duration),
}

impl From<StoreError> for QueueError {
    fn from(err: StoreError) -> Self {
        if err.is_corrupt() {
            Self::CorruptStore(err)
        } else {
            Self::Storage(err)
        }
    }
}
