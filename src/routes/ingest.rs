// Device-facing handlers: state updates, heartbeats, state lookup

use axum::{
    Json,
    extract::{Path, Request, State, rejection::JsonRejection},
    middleware::Next,
    response::Response,
};
use serde_json::{Value, json};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::DeviceState;

const API_KEY_HEADER: &str = "x-api-key";

/// Rejects requests whose X-API-KEY header is missing or wrong.
pub(super) async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let ok = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == &*state.api_key);
    if !ok {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}

fn no_payload() -> ApiError {
    ApiError::BadRequest("Invalid input: No JSON payload provided".into())
}

/// POST /api/update_state — `{device_id, state}` or `{device_id, heartbeat: "alive"}`.
pub(super) async fn update_state(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Ok(Json(Value::Object(body))) = payload else {
        return Err(no_payload());
    };
    if body.is_empty() {
        return Err(no_payload());
    }

    let device_id = body
        .get("device_id")
        .and_then(Value::as_str)
        .filter(|id| state.registry.is_known(id))
        .ok_or_else(|| ApiError::BadRequest("Invalid device identifier".into()))?;
    let now = chrono::Utc::now().timestamp();

    if body.get("heartbeat").and_then(Value::as_str) == Some("alive") {
        state.registry.record_heartbeat(device_id, now).await?;
        tracing::debug!(device_id, "heartbeat acknowledged");
        return Ok(Json(json!({
            "message": format!("Device {device_id} heartbeat acknowledged"),
        })));
    }

    let device_state = body
        .get("state")
        .and_then(Value::as_str)
        .and_then(DeviceState::parse)
        .ok_or_else(|| ApiError::BadRequest("Invalid state".into()))?;
    state
        .registry
        .record_state(device_id, device_state, now)
        .await?;
    tracing::info!(device_id, state = %device_state, "device checked in");

    Ok(Json(json!({
        "message": format!("Device {device_id} updated to state {device_state}"),
    })))
}

/// GET /api/get_state/{device_id}
pub(super) async fn get_state(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !state.registry.is_known(&device_id) {
        return Err(ApiError::BadRequest("Invalid device identifier".into()));
    }
    let record = state
        .registry
        .get(&device_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Device not found".into()))?;
    Ok(Json(json!({
        "device_id": device_id,
        "state": record.state,
        "last_updated": record.last_updated,
    })))
}
