// SPDX-License-Identifier: MIT

//! Stored rowing workout model.

use serde::{Deserialize, Serialize};

/// A synced rower workout as stored in Supabase.
///
/// `(user_id, provider_id)` is the natural key: re-syncing the same
/// Concept2 result updates the existing row instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Club app user ID
    pub user_id: String,
    /// Concept2 result ID (unique per user)
    pub provider_id: i64,
    /// Workout date as reported by Concept2
    pub workout_date: String,
    /// Distance in meters
    pub distance: i64,
    /// Elapsed time in whole seconds (Concept2 reports tenths)
    pub time_seconds: i64,
    /// Average stroke rate, if reported
    pub stroke_rate: Option<i64>,
    /// Average heart rate, if reported
    pub heart_rate: Option<i64>,
    /// Full provider payload, kept verbatim for future fields
    pub raw_payload: serde_json::Value,
    /// When this row was last written by a sync
    pub synced_at: String,
}
