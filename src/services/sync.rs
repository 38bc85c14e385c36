// SPDX-License-Identifier: MIT

//! Workout sync service.
//!
//! Handles the core workflow:
//! 1. Resolve the user's access token (request-supplied or stored)
//! 2. Fetch rower results from Concept2 (bounded pagination)
//! 3. Refresh the token and retry once on a 401
//! 4. Upsert each result into Supabase keyed by (user_id, provider_id)
//! 5. Record the sync time on the connection

use crate::db::SupabaseDb;
use crate::error::{AppError, Result};
use crate::models::{Connection, WorkoutRecord};
use crate::services::concept2::{Concept2Client, TokenResponse};
use crate::time_utils::{format_utc_rfc3339, tenths_to_seconds};

/// How many raw records are echoed back in the sync response. Everything
/// fetched is persisted; the sample only keeps the response body small.
const SAMPLE_SIZE: usize = 5;

/// Orchestrates token management, fetching, and persistence for one user.
#[derive(Clone)]
pub struct SyncService {
    client: Concept2Client,
    db: SupabaseDb,
}

/// Result of a completed sync.
#[derive(Debug)]
pub struct SyncOutcome {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub pages: u32,
    pub sample: Vec<serde_json::Value>,
}

impl SyncService {
    pub fn new(client: Concept2Client, db: SupabaseDb) -> Self {
        Self { client, db }
    }

    /// Bring stored workouts up to date with Concept2 for one user.
    ///
    /// `access_token` overrides the stored token when supplied; the stored
    /// connection is still consulted for the refresh token if the provider
    /// rejects the token with a 401. Exactly one refresh-and-retry is
    /// attempted; every other failure propagates as-is.
    pub async fn sync_user(
        &self,
        user_id: &str,
        access_token: Option<&str>,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<SyncOutcome> {
        tracing::info!(user_id, from = ?from_date, to = ?to_date, "Starting workout sync");

        // 1. Resolve credentials
        let mut connection = None;
        let token = match access_token {
            Some(token) => token.to_string(),
            None => {
                let stored = self
                    .db
                    .get_connection(user_id)
                    .await?
                    .ok_or_else(|| AppError::NotConnected(user_id.to_string()))?;
                let token = stored.access_token.clone();
                connection = Some(stored);
                token
            }
        };

        // 2. Fetch, with a single refresh-and-retry on 401
        let (records, pages) = match self
            .client
            .fetch_all_results(&token, from_date, to_date)
            .await
        {
            Ok(result) => result,
            Err(e) if e.is_unauthorized() => {
                let new_token = self.refresh_once(user_id, connection.take()).await?;
                self.client
                    .fetch_all_results(&new_token, from_date, to_date)
                    .await?
            }
            Err(e) => return Err(e),
        };

        tracing::info!(user_id, fetched = records.len(), pages, "Fetched rower results");

        // 3. Upsert sequentially, preserving provider order
        let synced_at = format_utc_rfc3339(chrono::Utc::now());
        let mut inserted = 0usize;
        let mut updated = 0usize;

        for record in &records {
            let Some(workout) = workout_from_result(user_id, record, &synced_at) else {
                tracing::warn!(user_id, payload = %record, "Skipping result without a numeric id");
                continue;
            };

            if self.db.upsert_workout(&workout).await? {
                inserted += 1;
            } else {
                updated += 1;
            }
        }

        // 4. Record the sync time, even when nothing came back
        self.db.touch_last_sync(user_id, &synced_at).await?;

        tracing::info!(user_id, inserted, updated, "Workout sync complete");

        let sample = records.iter().take(SAMPLE_SIZE).cloned().collect();
        Ok(SyncOutcome {
            fetched: records.len(),
            inserted,
            updated,
            pages,
            sample,
        })
    }

    /// Perform the single permitted token refresh for a 401.
    ///
    /// Returns the new access token after persisting the rotated pair.
    /// Any failure here maps to `TokenExpired`: either no refresh token is
    /// known, or the provider rejected the one we had.
    async fn refresh_once(&self, user_id: &str, connection: Option<Connection>) -> Result<String> {
        let connection = match connection {
            Some(c) => c,
            None => self
                .db
                .get_connection(user_id)
                .await?
                .ok_or_else(|| AppError::TokenExpired("no refresh token available".to_string()))?,
        };

        if connection.refresh_token.is_empty() {
            return Err(AppError::TokenExpired(
                "no refresh token available".to_string(),
            ));
        }

        tracing::info!(user_id, "Access token rejected, refreshing");

        let tokens = self
            .client
            .refresh_token(&connection.refresh_token)
            .await
            .map_err(|e| match e {
                AppError::Provider { status, body } => {
                    AppError::TokenExpired(format!("refresh failed (HTTP {}): {}", status, body))
                }
                other => AppError::TokenExpired(format!("refresh failed: {}", other)),
            })?;

        self.db
            .update_connection_tokens(
                user_id,
                &tokens.access_token,
                &tokens.refresh_token,
                &absolute_expiry(tokens.expires_in),
            )
            .await?;

        tracing::info!(user_id, "Token refreshed and stored");
        Ok(tokens.access_token)
    }

    /// Persist a freshly exchanged token pair as the user's connection.
    ///
    /// Fetch-modify-write so a re-connect keeps the existing last_sync_at.
    pub async fn store_connection(&self, user_id: &str, tokens: &TokenResponse) -> Result<()> {
        let last_sync_at = self
            .db
            .get_connection(user_id)
            .await?
            .and_then(|c| c.last_sync_at);

        let connection = Connection {
            user_id: user_id.to_string(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_expires_at: absolute_expiry(tokens.expires_in),
            connected: true,
            last_sync_at,
        };

        self.db.upsert_connection(&connection).await
    }
}

/// Compute the absolute expiry for a token lifetime in seconds.
fn absolute_expiry(expires_in: i64) -> String {
    format_utc_rfc3339(chrono::Utc::now() + chrono::Duration::seconds(expires_in))
}

/// Build a storable workout from a raw Logbook result.
///
/// Concept2 reports elapsed time in tenths of a second; it is stored as
/// whole seconds. Heart rate comes from the nested `heart_rate.average`
/// field when present. Returns `None` if the record has no numeric id.
fn workout_from_result(
    user_id: &str,
    result: &serde_json::Value,
    synced_at: &str,
) -> Option<WorkoutRecord> {
    let provider_id = result.get("id").and_then(|v| v.as_i64())?;

    Some(WorkoutRecord {
        user_id: user_id.to_string(),
        provider_id,
        workout_date: result
            .get("date")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        distance: result.get("distance").and_then(|v| v.as_i64()).unwrap_or(0),
        time_seconds: tenths_to_seconds(result.get("time").and_then(|v| v.as_i64()).unwrap_or(0)),
        stroke_rate: result.get("stroke_rate").and_then(|v| v.as_i64()),
        heart_rate: result
            .get("heart_rate")
            .and_then(|hr| hr.get("average"))
            .and_then(|v| v.as_i64()),
        raw_payload: result.clone(),
        synced_at: synced_at.to_string(),
    })
}
