use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::{handlers, state::AppState};

// Score submissions are a few hundred bytes; anything near this is abuse.
const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Build the primary axum router with the provided shared application state.
///
/// API routes live under `/api`; every other path is served from `static_dir`.
pub fn build_router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    let api = Router::new()
        .route("/leaderboard", get(handlers::leaderboard::get_leaderboard))
        .route("/user/{employee_id}", get(handlers::users::user_exists))
        .route("/scores", post(handlers::scores::create_score))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(Extension(state));

    let static_service = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_service)
}

async fn health_handler() -> impl IntoResponse {
    // Liveness: always return 200 OK when process is alive.
    (StatusCode::OK, "OK")
}

async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    // Not ready once the queue has started draining.
    if state.queue.is_accepting() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting down")
    }
}
