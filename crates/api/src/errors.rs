use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fleet_agent_domain::DomainError;
use serde_json::json;

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::CollectorNotFound(..) => (StatusCode::NOT_FOUND, self.0.to_string()),

            DomainError::ConfigInvalid(..) | DomainError::KeepaliveParseFailed(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }

            DomainError::TransientNetwork(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string())
            }

            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
