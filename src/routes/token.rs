// SPDX-License-Identifier: MIT

//! Concept2 OAuth token exchange endpoint.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/oauth/token", post(exchange_token))
}

/// Request body for the token exchange endpoint.
#[derive(Deserialize)]
pub struct TokenExchangeRequest {
    /// Authorization code (authorization_code grant)
    pub code: Option<String>,
    /// Redirect URI used during authorization (authorization_code grant)
    pub redirect_uri: Option<String>,
    /// Club app user to attach the connection to (optional)
    pub user_id: Option<String>,
    /// Refresh token (refresh_token grant)
    pub refresh_token: Option<String>,
    /// Defaults to "authorization_code"
    pub grant_type: Option<String>,
}

#[derive(Serialize)]
pub struct TokenExchangeResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Exchange an authorization code or refresh token for a token pair.
///
/// When a `user_id` is supplied the resulting pair is also stored as the
/// user's connection. That write is best-effort: the exchange already
/// succeeded, so a storage failure is logged and the tokens are still
/// returned to the caller.
async fn exchange_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenExchangeRequest>,
) -> Result<Json<TokenExchangeResponse>> {
    state.config.require_client_credentials()?;

    let grant_type = req.grant_type.as_deref().unwrap_or("authorization_code");

    let tokens = match grant_type {
        "authorization_code" => {
            let code = require_field(req.code.as_deref(), "code")?;
            let redirect_uri = require_field(req.redirect_uri.as_deref(), "redirect_uri")?;
            state.concept2.exchange_code(code, redirect_uri).await?
        }
        "refresh_token" => {
            let refresh_token = require_field(req.refresh_token.as_deref(), "refresh_token")?;
            state.concept2.refresh_token(refresh_token).await?
        }
        other => {
            return Err(AppError::Validation(format!(
                "Unsupported grant_type: {}",
                other
            )));
        }
    };

    tracing::info!(grant_type, "Concept2 token exchange successful");

    if let Some(user_id) = req.user_id.as_deref() {
        if let Err(e) = state.sync_service.store_connection(user_id, &tokens).await {
            tracing::warn!(user_id, error = %e, "Failed to store connection, continuing anyway");
        }
    }

    Ok(Json(TokenExchangeResponse {
        success: true,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

/// Reject missing or empty required fields before any network call.
fn require_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field_present() {
        assert_eq!(require_field(Some("abc"), "code").unwrap(), "abc");
    }

    #[test]
    fn test_require_field_missing_or_empty() {
        assert!(matches!(
            require_field(None, "code").unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            require_field(Some(""), "code").unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
