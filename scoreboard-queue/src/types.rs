//! Core types for the task queue.

use scoreboard_store::{LeaderboardDocument, NewScore, ScoreEntry};
use serde_json::Value;

use crate::error::QueueError;

/// Wire tags for each operation, for callers that name operations by string.
///
/// The HTTP handlers use the typed [`TaskQueue`](crate::TaskQueue) helpers;
/// these tags and [`Operation::from_tag`] are the entry point for anything
/// that instead sends an operation name plus a JSON payload.
pub mod operation_tags {
    pub const GET_LEADERBOARD: &str = "getLeaderboard";
    pub const CHECK_USER: &str = "checkUser";
    pub const ADD_SCORE: &str = "addScore";
}

/// A storage operation executed by the queue worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Return the stored document unchanged.
    GetLeaderboard,
    /// Report whether an entry with this identifier exists.
    CheckUser { employee_id: String },
    /// Append a new entry unless its identifier is already present.
    AddScore(NewScore),
}

impl Operation {
    /// The operation's tag, used in logs.
    #[inline]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::GetLeaderboard => operation_tags::GET_LEADERBOARD,
            Self::CheckUser { .. } => operation_tags::CHECK_USER,
            Self::AddScore(_) => operation_tags::ADD_SCORE,
        }
    }

    /// Build an operation from its tag and JSON payload.
    ///
    /// This is how string-tagged requests enter the queue, and the only place
    /// an unknown operation can be named.
    ///
    /// `checkUser` expects `{"employeeId": ...}`; `addScore` expects a
    /// [`NewScore`]; `getLeaderboard` ignores the payload.
    pub fn from_tag(tag: &str, payload: Value) -> Result<Self, QueueError> {
        match tag {
            operation_tags::GET_LEADERBOARD => Ok(Self::GetLeaderboard),
            operation_tags::CHECK_USER => {
                let employee_id = payload
                    .get("employeeId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        QueueError::InvalidOperation(format!("{tag}: missing employeeId"))
                    })?;
                Ok(Self::CheckUser {
                    employee_id: employee_id.to_owned(),
                })
            }
            operation_tags::ADD_SCORE => serde_json::from_value(payload)
                .map(Self::AddScore)
                .map_err(|e| QueueError::InvalidOperation(format!("{tag}: {e}"))),
            other => Err(QueueError::InvalidOperation(format!(
                "unknown operation: {other}"
            ))),
        }
    }
}

/// What a successful task produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Leaderboard(LeaderboardDocument),
    UserExists(bool),
    ScoreAdded(ScoreEntry),
}

/// Point-in-time counters for the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks accepted into the queue.
    pub submitted: u64,
    pub completed: u64,
    /// Accepted tasks that resolved with an error, including those answered
    /// with `ShuttingDown` after the stop marker.
    pub failed: u64,
    /// Submissions refused before they were queued.
    pub rejected: u64,
}

impl QueueStats {
    /// Accepted tasks that have not resolved yet.
    #[inline]
    pub fn pending(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
    }
}
