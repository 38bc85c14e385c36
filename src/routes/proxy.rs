// SPDX-License-Identifier: MIT

//! Token-verification and fetch proxy endpoint.
//!
//! The web app calls this with its own bearer token; nothing here touches
//! the database. "verify" confirms the token against the profile endpoint,
//! "sync" runs the bounded paginated fetch and returns the records.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/proxy", post(proxy))
}

/// Request body for the proxy endpoint.
#[derive(Deserialize)]
pub struct ProxyRequest {
    pub action: Option<String>,
    pub access_token: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ProxyResponse {
    Verify {
        success: bool,
        user: serde_json::Value,
    },
    Fetch {
        success: bool,
        count: usize,
        pages: u32,
        data: Vec<serde_json::Value>,
    },
}

async fn proxy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>> {
    state.config.require_client_credentials()?;

    let access_token = match req.access_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => return Err(AppError::Validation("access_token is required".to_string())),
    };

    match req.action.as_deref() {
        Some("verify") => {
            let user = state.concept2.get_current_user(access_token).await?;
            Ok(Json(ProxyResponse::Verify {
                success: true,
                user,
            }))
        }
        Some("sync") => {
            let (data, pages) = state
                .concept2
                .fetch_all_results(
                    access_token,
                    req.from_date.as_deref(),
                    req.to_date.as_deref(),
                )
                .await?;

            Ok(Json(ProxyResponse::Fetch {
                success: true,
                count: data.len(),
                pages,
                data,
            }))
        }
        other => Err(AppError::Validation(format!(
            "Unknown action: {}",
            other.unwrap_or("<missing>")
        ))),
    }
}
