use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /ping
/// Liveness check; also tells the front-end whether the Slack routes are usable.
pub async fn ping_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "slack_configured": state.emoji_store.is_some(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
