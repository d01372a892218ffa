pub mod health;
pub mod images;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Body limit above the store's own upload ceiling, so oversized uploads are
/// rejected by the store with a proper error body instead of being cut off
/// mid-read
const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// Creates the router with all handler routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handler))
        .route("/v1/images", post(images::upload).get(images::list))
        .route("/v1/images/{id}", delete(images::remove))
        .route("/v1/images/{id}/content", get(images::content))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
