use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use fleet_agent_application::use_cases::{KeepaliveEvent, KeepaliveResponse};
use tracing::instrument;

#[instrument(skip_all)]
pub async fn health_check() -> &'static str {
    "OK"
}

/// Entry point for the control plane's out-of-band keepalive/probe/task
/// channel. Always returns 200; success/failure is carried in the
/// response body, matching the wire contract's `{success, message, ...}`
/// shape rather than HTTP status codes.
#[instrument(skip(state, event), fields(action = %event.action, request_id = %event.request_id))]
pub async fn handle_event(
    State(state): State<AppState>,
    Json(event): Json<KeepaliveEvent>,
) -> (StatusCode, Json<KeepaliveResponse>) {
    let response = state.keepalive.handle(event).await;
    (StatusCode::OK, Json(response))
}
