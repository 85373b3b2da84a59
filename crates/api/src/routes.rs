use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

/// Creates all API routes with state.
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/events", post(handlers::handle_event))
        .with_state(state)
}
