// SPDX-License-Identifier: MIT

//! Concept2 Logbook API client.
//!
//! Handles:
//! - OAuth token exchange (authorization code and refresh grants)
//! - Profile lookup for token verification
//! - Paginated rower result fetching with a hard page cap

use crate::error::AppError;
use serde::Deserialize;

/// Nominal page size of the Logbook results endpoint.
pub const PAGE_SIZE: usize = 25;

/// Hard cap on pages fetched in one sync, even if the provider keeps
/// returning full pages.
pub const MAX_PAGES: u32 = 50;

/// Scope requested on the authorization code grant.
const OAUTH_SCOPE: &str = "user:read,results:read";

/// Vendor media type required by the Logbook API.
const ACCEPT_HEADER: &str = "application/vnd.c2logbook.v1+json";

/// Concept2 Logbook API client.
#[derive(Clone)]
pub struct Concept2Client {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl Concept2Client {
    /// Create a new Concept2 client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_url(
            client_id,
            client_secret,
            "https://log.concept2.com".to_string(),
        )
    }

    /// Create a client against a non-default base URL (tests point this at
    /// an in-process mock server).
    pub fn with_base_url(client_id: String, client_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    // ─── OAuth ───────────────────────────────────────────────────

    /// Exchange an authorization code for a token pair.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("scope", OAUTH_SCOPE),
        ])
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let url = format!("{}/oauth/access_token", self.base_url);

        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Token request failed: {}", e)))?;

        check_response_json(response).await
    }

    // ─── Profile ─────────────────────────────────────────────────

    /// Get the profile for the authenticated user.
    ///
    /// Used to verify that a bearer token is still valid.
    pub async fn get_current_user(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/api/users/me", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let envelope: DataEnvelope<serde_json::Value> = check_response_json(response).await?;
        Ok(envelope.data)
    }

    // ─── Results ─────────────────────────────────────────────────

    /// Fetch one page of rower results.
    ///
    /// Records are returned as raw JSON values so the full payload can be
    /// stored verbatim alongside the extracted fields.
    pub async fn fetch_results_page(
        &self,
        access_token: &str,
        page: u32,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let url = format!("{}/api/users/me/results", self.base_url);

        let mut query: Vec<(&str, String)> =
            vec![("type", "rower".to_string()), ("page", page.to_string())];
        if let Some(from) = from_date {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = to_date {
            query.push(("to", to.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let envelope: DataEnvelope<Vec<serde_json::Value>> = check_response_json(response).await?;
        Ok(envelope.data)
    }

    /// Fetch all rower results in the optional date window.
    ///
    /// Pages are fetched sequentially from page 1. A page shorter than
    /// [`PAGE_SIZE`] (including an empty one) is the last page, and
    /// [`MAX_PAGES`] is a hard stop rather than an error. A failure on
    /// page 1 is fatal; a failure on any later page ends the fetch with
    /// whatever accumulated so far.
    ///
    /// Returns the records in provider order plus the number of pages
    /// actually fetched.
    pub async fn fetch_all_results(
        &self,
        access_token: &str,
        from_date: Option<&str>,
        to_date: Option<&str>,
    ) -> Result<(Vec<serde_json::Value>, u32), AppError> {
        let mut all_results = Vec::new();
        let mut pages_fetched = 0u32;

        for page in 1..=MAX_PAGES {
            let records = match self
                .fetch_results_page(access_token, page, from_date, to_date)
                .await
            {
                Ok(records) => records,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    // Mid-fetch failures are treated as end-of-data: keep
                    // what we have rather than throwing away prior pages.
                    tracing::warn!(page, error = %e, "Results page failed, stopping fetch");
                    break;
                }
            };

            pages_fetched = page;
            let count = records.len();
            all_results.extend(records);

            if count < PAGE_SIZE {
                break;
            }
        }

        Ok((all_results, pages_fetched))
    }
}

/// Token response from the Concept2 OAuth endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

/// The Logbook API wraps every payload in a `data` field.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Provider { status, body });
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Transport(format!("JSON parse error: {}", e)))
}
