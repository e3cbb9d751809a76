//! Persisted leaderboard shape.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::StoreError;

/// The whole persisted leaderboard. Entries stay in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardDocument {
    pub scores: Vec<ScoreEntry>,
}

/// One participant's submitted result.
///
/// Field order here is the key order written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub employee_id: String,
    /// Kept as the original JSON number so `80` is never rewritten as `80.0`.
    pub percentage: Number,
    pub time_taken: String,
    pub date: String,
}

/// A submission as received from a client, before the server stamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScore {
    pub employee_id: String,
    pub percentage: Number,
    pub time_taken: String,
}

impl NewScore {
    pub fn new(
        employee_id: impl Into<String>,
        percentage: impl Into<Number>,
        time_taken: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            percentage: percentage.into(),
            time_taken: time_taken.into(),
        }
    }

    /// Attach the server-assigned timestamp.
    pub fn into_entry(self, date: impl Into<String>) -> ScoreEntry {
        ScoreEntry {
            employee_id: self.employee_id,
            percentage: self.percentage,
            time_taken: self.time_taken,
            date: date.into(),
        }
    }
}

impl ScoreEntry {
    /// Percentage as a float for ordering; non-finite representations rank last.
    #[inline]
    pub fn percentage_value(&self) -> f64 {
        self.percentage.as_f64().unwrap_or(f64::NEG_INFINITY)
    }
}

impl LeaderboardDocument {
    /// True if an entry with exactly this identifier exists.
    pub fn contains(&self, employee_id: &str) -> bool {
        self.scores.iter().any(|s| s.employee_id == employee_id)
    }

    /// Two-space pretty JSON, no trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(StoreError::Encode)
    }
}
