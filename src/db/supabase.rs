// SPDX-License-Identifier: MIT

//! Supabase REST (PostgREST) client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Connections (per-user OAuth token state)
//! - Workouts (synced Concept2 results)
//!
//! All access goes through the service role key, so this client must only
//! ever run server-side.

use crate::db::tables;
use crate::error::AppError;
use crate::models::{Connection, WorkoutRecord};
use serde::de::DeserializeOwned;

/// Inner client state (absent in offline mock mode).
#[derive(Clone)]
struct SupabaseClient {
    http: reqwest::Client,
    rest_url: String,
    service_key: String,
}

/// Supabase database client.
#[derive(Clone)]
pub struct SupabaseDb {
    client: Option<SupabaseClient>,
}

impl SupabaseDb {
    /// Create a new Supabase client.
    ///
    /// `base_url` is the project URL; the PostgREST endpoint lives under
    /// `/rest/v1`.
    pub fn new(base_url: &str, service_key: &str) -> Self {
        Self {
            client: Some(SupabaseClient {
                http: reqwest::Client::new(),
                rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
                service_key: service_key.to_string(),
            }),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&SupabaseClient, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Connection Operations ───────────────────────────────────

    /// Get the Concept2 connection for a user, if any.
    pub async fn get_connection(&self, user_id: &str) -> Result<Option<Connection>, AppError> {
        let client = self.get_client()?;
        let rows: Vec<Connection> = client
            .select(
                tables::CONNECTIONS,
                &format!("user_id={}&limit=1", eq(user_id)),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Create or replace the connection row for a user.
    pub async fn upsert_connection(&self, connection: &Connection) -> Result<(), AppError> {
        let client = self.get_client()?;
        let url = format!(
            "{}/{}?on_conflict=user_id",
            client.rest_url,
            tables::CONNECTIONS
        );

        let response = client
            .http
            .post(&url)
            .headers(client.auth_headers())
            .header("Prefer", "resolution=merge-duplicates")
            .json(connection)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_ok(response).await
    }

    /// Update only the token fields of an existing connection.
    pub async fn update_connection_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: &str,
        token_expires_at: &str,
    ) -> Result<(), AppError> {
        self.patch_connection(
            user_id,
            &serde_json::json!({
                "access_token": access_token,
                "refresh_token": refresh_token,
                "token_expires_at": token_expires_at,
                "connected": true,
            }),
        )
        .await
    }

    /// Record a successful sync time on the connection.
    pub async fn touch_last_sync(&self, user_id: &str, synced_at: &str) -> Result<(), AppError> {
        self.patch_connection(user_id, &serde_json::json!({ "last_sync_at": synced_at }))
            .await
    }

    async fn patch_connection(
        &self,
        user_id: &str,
        body: &serde_json::Value,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let url = format!(
            "{}/{}?user_id={}",
            client.rest_url,
            tables::CONNECTIONS,
            eq(user_id)
        );

        let response = client
            .http
            .patch(&url)
            .headers(client.auth_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_ok(response).await
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// Get a stored workout by its natural key.
    pub async fn get_workout(
        &self,
        user_id: &str,
        provider_id: i64,
    ) -> Result<Option<WorkoutRecord>, AppError> {
        let client = self.get_client()?;
        let rows: Vec<WorkoutRecord> = client
            .select(
                tables::WORKOUTS,
                &format!(
                    "user_id={}&provider_id=eq.{}&limit=1",
                    eq(user_id),
                    provider_id
                ),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Insert-or-update a workout keyed by `(user_id, provider_id)`.
    ///
    /// Returns `true` if a new row was inserted, `false` if an existing row
    /// was updated. The select-then-write pair is intentionally sequential;
    /// the unique constraint on the natural key keeps racing syncs
    /// idempotent.
    pub async fn upsert_workout(&self, record: &WorkoutRecord) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let existing = self.get_workout(&record.user_id, record.provider_id).await?;

        if existing.is_some() {
            let url = format!(
                "{}/{}?user_id={}&provider_id=eq.{}",
                client.rest_url,
                tables::WORKOUTS,
                eq(&record.user_id),
                record.provider_id
            );

            let response = client
                .http
                .patch(&url)
                .headers(client.auth_headers())
                .json(record)
                .send()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            check_ok(response).await?;
            Ok(false)
        } else {
            let url = format!("{}/{}", client.rest_url, tables::WORKOUTS);

            let response = client
                .http
                .post(&url)
                .headers(client.auth_headers())
                .json(record)
                .send()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            check_ok(response).await?;
            Ok(true)
        }
    }
}

impl SupabaseClient {
    fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(key) = reqwest::header::HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", self.service_key))
        {
            headers.insert(reqwest::header::AUTHORIZATION, bearer);
        }
        headers
    }

    /// GET rows from a table with a pre-encoded query string.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>, AppError> {
        let url = format!("{}/{}?{}", self.rest_url, table, query);

        let response = self
            .http
            .get(&url)
            .headers(self.auth_headers())
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))
    }
}

/// Build a PostgREST `eq.` filter value, encoding the user-supplied part.
fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

/// Check a write response status, discarding any body.
async fn check_ok(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Database(format!("HTTP {}: {}", status, body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_encodes_filter_values() {
        assert_eq!(eq("user-1"), "eq.user-1");
        // Reserved characters must not leak into the query string raw.
        assert_eq!(eq("a&b=c"), "eq.a%26b%3Dc");
    }

    #[tokio::test]
    async fn test_mock_db_errors_offline() {
        let db = SupabaseDb::new_mock();
        let err = db.get_connection("user-1").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
