// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// This is a closed taxonomy: handlers branch on variants, never on
/// message strings. Provider failures keep the upstream status and raw
/// body so callers can diagnose them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("No Concept2 connection for user {0}")]
    NotConnected(String),

    #[error("Concept2 token expired: {0}")]
    TokenExpired(String),

    #[error("Concept2 API error (HTTP {status})")]
    Provider { status: u16, body: String },

    #[error("Missing configuration: {0}")]
    Config(&'static str),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True if this is a provider rejection of the access token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Provider { status: 401, .. })
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, upstream, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                None,
                Some(msg.clone()),
            ),
            AppError::NotConnected(user_id) => (
                StatusCode::NOT_FOUND,
                "not_connected",
                None,
                Some(format!("No Concept2 connection for user {}", user_id)),
            ),
            AppError::TokenExpired(detail) => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                None,
                Some(detail.clone()),
            ),
            AppError::Provider { status, body } => {
                // Forward the provider's status so the frontend reacts to
                // 401/403/429 the same way it would talking to Concept2
                // directly.
                let code = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                (code, "provider_error", Some(*status), Some(body.clone()))
            }
            AppError::Config(var) => {
                tracing::error!(var = %var, "Missing configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    None,
                    Some(format!("Missing configuration: {}", var)),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    None,
                    None,
                )
            }
            AppError::Transport(msg) => {
                tracing::error!(error = %msg, "Upstream transport error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "transport_error",
                    None,
                    Some(msg.clone()),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            status: upstream,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_forwards_status() {
        let err = AppError::Provider {
            status: 403,
            body: "forbidden".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_provider_error_invalid_status_maps_to_bad_gateway() {
        let err = AppError::Provider {
            status: 42,
            body: String::new(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_is_unauthorized() {
        let unauthorized = AppError::Provider {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.is_unauthorized());

        let forbidden = AppError::Provider {
            status: 403,
            body: String::new(),
        };
        assert!(!forbidden.is_unauthorized());
        assert!(!AppError::TokenExpired("expired".to_string()).is_unauthorized());
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = AppError::Validation("access_token is required".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
