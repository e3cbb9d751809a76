//! Read-time leaderboard ordering.

use std::cmp::Ordering;

use crate::document::{LeaderboardDocument, ScoreEntry};

/// Parse a `MM:SS` (or `H:MM:SS`) duration into whole seconds.
///
/// Each `:`-separated component multiplies the running total by 60 before
/// being added, so `"01:30"` is 90 and `"1:00:00"` is 3600.
pub fn time_taken_seconds(time_taken: &str) -> Option<u64> {
    time_taken.split(':').try_fold(0u64, |acc, part| {
        let n = part.trim().parse::<u64>().ok()?;
        acc.checked_mul(60)?.checked_add(n)
    })
}

fn compare(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    b.percentage_value()
        .total_cmp(&a.percentage_value())
        .then_with(|| {
            match (
                time_taken_seconds(&a.time_taken),
                time_taken_seconds(&b.time_taken),
            ) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
}

/// Rank entries for display: highest percentage first, faster time breaks ties.
///
/// The sort is stable, so entries that compare equal keep insertion order.
/// Unparseable times sort after parseable ones at the same percentage.
pub fn rank(document: &LeaderboardDocument) -> LeaderboardDocument {
    let mut scores = document.scores.clone();
    scores.sort_by(compare);
    LeaderboardDocument { scores }
}
