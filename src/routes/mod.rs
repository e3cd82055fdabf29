// HTTP routes: ingestion API, scoreboard read, static dashboard

mod http;
mod ingest;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::ingest::DeviceRegistry;
use crate::store::ScoreboardStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Arc<DeviceRegistry>,
    pub(crate) scoreboard_store: Arc<ScoreboardStore>,
    pub(crate) api_key: Arc<str>,
}

pub fn app(
    registry: Arc<DeviceRegistry>,
    scoreboard_store: Arc<ScoreboardStore>,
    config: &AppConfig,
) -> Router {
    let state = AppState {
        registry,
        scoreboard_store,
        api_key: Arc::from(config.ingest.api_key.as_str()),
    };

    // Device-facing endpoints require X-API-KEY; checked before the body is read.
    let device_api = Router::new()
        .route("/api/update_state", post(ingest::update_state)) // POST /api/update_state
        .route("/api/get_state/{device_id}", get(ingest::get_state)) // GET /api/get_state/{id}
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ingest::require_api_key,
        ));

    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/scoreboard", get(http::scoreboard_handler)) // GET /api/scoreboard
        .merge(device_api)
        .fallback_service(ServeDir::new(&config.dashboard.dir))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
