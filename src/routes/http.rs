// GET handlers: version, api/scoreboard

use axum::{extract::State, response::IntoResponse};

use super::AppState;
use crate::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/scoreboard — last persisted scoreboard; all zeros before the first pass.
pub(super) async fn scoreboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.scoreboard_store.load_or_default().await)
}
