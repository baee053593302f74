//! Error types for the HTTP API.
//!
//! [`ApiError`] converts every failure the endpoints can hit into an Axum
//! response with a `{"error", "status"}` JSON body. A missing API key is the
//! caller's fault (400); anything else is reported as 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gridworld_core::scenario::ScenarioError;
use gridworld_core::turn::TurnError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Advancing the turn failed.
    #[error("turn failed: {0}")]
    Turn(TurnError),

    /// Telling the story failed.
    #[error("story failed: {0}")]
    Story(TurnError),

    /// Generating a scenario failed.
    #[error("scenario failed: {0}")]
    Scenario(ScenarioError),
}

impl ApiError {
    /// The HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Turn(TurnError::MissingCredential)
            | Self::Story(TurnError::MissingCredential)
            | Self::Scenario(ScenarioError::MissingCredential) => StatusCode::BAD_REQUEST,
            Self::Turn(_) | Self::Story(_) | Self::Scenario(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_client_error() {
        assert_eq!(
            ApiError::Turn(TurnError::MissingCredential).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Scenario(ScenarioError::MissingCredential).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn other_failures_are_server_errors() {
        let err = ApiError::Turn(TurnError::EmptyHistory);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "turn failed: game state has no history");
    }
}
