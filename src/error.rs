use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::provider::Provider;

/// Failure while talking to a vendor.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{provider} API error ({status}): {message}")]
    Upstream {
        provider: Provider,
        status: StatusCode,
        message: String,
    },

    #[error("failed to reach {provider}: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed {provider} response: {reason}")]
    MalformedResponse { provider: Provider, reason: String },
}

/// Error returned to the browser as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Upstream {
                status, message, ..
            } => ApiError::new(status, message),
            GatewayError::Transport { provider, .. } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!("Failed to reach {} API", provider.display_name()),
            ),
            GatewayError::MalformedResponse { provider, .. } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!("Unexpected {} API response", provider.display_name()),
            ),
        }
    }
}
