pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::emoji::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(health::ping_handler))
        .route("/api/ping", get(health::ping_handler))
        // Sizing and rendering
        .route("/api/v1/emoji/fit", post(handlers::handle_fit))
        .route("/api/v1/emoji/render", post(handlers::handle_render))
        // Workspace emojis (Slack)
        .route("/emoji/list", get(handlers::handle_list))
        .route("/emoji/add", post(handlers::handle_add))
        .route("/api/emojis/add", post(handlers::handle_add_multipart))
        .route("/api/v1/emoji/upload", post(handlers::handle_upload_rendered))
        .fallback(not_found)
        .with_state(state)
}
