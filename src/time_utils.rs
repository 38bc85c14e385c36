// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and Concept2 time units.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Convert Concept2 elapsed time (tenths of a second) to whole seconds,
/// rounding half away from zero.
pub fn tenths_to_seconds(tenths: i64) -> i64 {
    if tenths >= 0 {
        (tenths + 5) / 10
    } else {
        (tenths - 5) / 10
    }
}
