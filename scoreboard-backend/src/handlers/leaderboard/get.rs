use std::sync::Arc;

use axum::extract::{Extension, Json};
use scoreboard_store::{rank, LeaderboardDocument};

use crate::{error::ApiError, state::AppState};

/// Leaderboard ranked for display; the stored order is left as is.
pub async fn get(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<LeaderboardDocument>, ApiError> {
    let document = state.queue.leaderboard().await?;
    Ok(Json(rank(&document)))
}
