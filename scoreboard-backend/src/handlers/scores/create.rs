use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
};
use scoreboard_store::NewScore;

use super::dto::ScoreCreatedResponse;
use crate::{error::ApiError, state::AppState};

/// Record a score. Each employee may submit once; the server stamps the date.
pub async fn create(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<NewScore>, JsonRejection>,
) -> Result<(StatusCode, Json<ScoreCreatedResponse>), ApiError> {
    let Json(score) = payload?;

    let entry = state.queue.add_score(score).await?;
    tracing::info!(
        employee_id = %entry.employee_id,
        percentage = %entry.percentage,
        time_taken = %entry.time_taken,
        "score submitted"
    );

    Ok((StatusCode::CREATED, Json(ScoreCreatedResponse::submitted())))
}
