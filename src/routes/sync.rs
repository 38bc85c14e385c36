// SPDX-License-Identifier: MIT

//! Workout sync endpoint.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/sync", post(sync_workouts))
}

/// Request body for the sync endpoint.
#[derive(Deserialize)]
pub struct SyncRequest {
    pub user_id: Option<String>,
    /// Overrides the stored access token when supplied
    pub access_token: Option<String>,
    /// Optional date window (YYYY-MM-DD)
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    /// First few raw records, for display only; everything fetched was
    /// persisted.
    pub sample: Vec<serde_json::Value>,
}

/// Sync a user's Concept2 rower workouts into Supabase.
async fn sync_workouts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    state.config.require_client_credentials()?;

    let user_id = match req.user_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(AppError::Validation("user_id is required".to_string())),
    };

    let outcome = state
        .sync_service
        .sync_user(
            user_id,
            req.access_token.as_deref(),
            req.from_date.as_deref(),
            req.to_date.as_deref(),
        )
        .await?;

    Ok(Json(SyncResponse {
        success: true,
        fetched: outcome.fetched,
        inserted: outcome.inserted,
        updated: outcome.updated,
        sample: outcome.sample,
    }))
}
