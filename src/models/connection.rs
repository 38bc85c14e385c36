// SPDX-License-Identifier: MIT

//! Per-user Concept2 connection state.

use serde::{Deserialize, Serialize};

/// Stored OAuth connection for a club member.
///
/// Created on the first successful token exchange, updated on every token
/// refresh and after every sync. Never deleted by the sync backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Club app user ID (row key together with the unique constraint)
    pub user_id: String,
    /// Current Concept2 access token
    pub access_token: String,
    /// Current Concept2 refresh token
    pub refresh_token: String,
    /// When the access token expires (RFC3339)
    pub token_expires_at: String,
    /// Whether the user currently has a live connection
    pub connected: bool,
    /// Last successful workout sync (RFC3339)
    pub last_sync_at: Option<String>,
}
