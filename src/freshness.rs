//! Coarse "how long ago" labels for timestamps.

use chrono::{DateTime, Datelike, Utc};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Format the age of `timestamp` relative to `now`.
///
/// Absent timestamps produce an empty label. Elapsed time is floored to whole
/// minutes and bucketed:
///
/// | elapsed minutes | label        |
/// |-----------------|--------------|
/// | < 1             | `just now`   |
/// | < 60            | `{m}m ago`   |
/// | < 1440          | `{h}h ago`   |
/// | otherwise       | `{d}d ago`   |
///
/// Timestamps in the future (clock skew between daemon and viewer) are
/// clamped to `just now`.
pub fn time_ago(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return String::new();
    };

    let minutes = now.signed_duration_since(timestamp).num_minutes().max(0);

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < MINUTES_PER_HOUR {
        format!("{}m ago", minutes)
    } else if minutes < MINUTES_PER_DAY {
        format!("{}h ago", minutes / MINUTES_PER_HOUR)
    } else {
        format!("{}d ago", minutes / MINUTES_PER_DAY)
    }
}

/// Parse an RFC 3339 timestamp from the daemon.
///
/// Empty strings and Go's zero time (`0001-01-01T00:00:00Z`, which the daemon
/// emits for "never") are treated as absent.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let parsed = DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc);
    if parsed.year() <= 1 {
        return Ok(None);
    }
    Ok(Some(parsed))
}
