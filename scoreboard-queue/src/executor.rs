//! The body of a single queued task.

use chrono::{SecondsFormat, Utc};
use scoreboard_store::DocumentStore;

use crate::error::QueueError;
use crate::types::{Operation, Outcome};

/// UTC timestamp with millisecond precision, e.g. `2024-05-01T09:30:00.123Z`.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run one operation against the store.
///
/// Every task reads the whole document first; only a successful `AddScore`
/// writes it back, and only after every check has passed.
pub(crate) async fn execute<S>(store: &S, operation: Operation) -> Result<Outcome, QueueError>
where
    S: DocumentStore + ?Sized,
{
    store.ensure_exists().await?;
    let mut document = store.load().await?;

    match operation {
        Operation::GetLeaderboard => Ok(Outcome::Leaderboard(document)),
        Operation::CheckUser { employee_id } => {
            Ok(Outcome::UserExists(document.contains(&employee_id)))
        }
        Operation::AddScore(new_score) => {
            if document.contains(&new_score.employee_id) {
                return Err(QueueError::DuplicateUser(new_score.employee_id));
            }
            let entry = new_score.into_entry(timestamp_now());
            document.scores.push(entry.clone());
            store.save(&document).await?;
            Ok(Outcome::ScoreAdded(entry))
        }
    }
}
