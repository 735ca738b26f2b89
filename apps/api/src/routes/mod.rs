pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::optimizer::handlers;
use crate::state::AppState;

/// Room for the job description and multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes/optimize",
            post(handlers::handle_optimize),
        )
        .route("/api/v1/resumes/latest", get(handlers::handle_get_latest))
        .route(
            "/api/v1/resumes/latest/pdf",
            get(handlers::handle_get_latest_pdf),
        )
        .route("/api/v1/resumes/render", post(handlers::handle_render))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
