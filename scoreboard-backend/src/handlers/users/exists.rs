use std::sync::Arc;

use axum::extract::{Extension, Json, Path};

use super::dto::UserExistsResponse;
use crate::{error::ApiError, state::AppState};

/// Whether this employee already has a score on the board.
pub async fn exists(
    Extension(state): Extension<Arc<AppState>>,
    Path(employee_id): Path<String>,
) -> Result<Json<UserExistsResponse>, ApiError> {
    let exists = state.queue.user_exists(employee_id).await?;
    Ok(Json(UserExistsResponse { exists }))
}
