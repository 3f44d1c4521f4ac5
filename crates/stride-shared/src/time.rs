//! Timestamp parsing and display helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::constants::DISPLAY_TIME_FORMAT;

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 as well as the zone-less `YYYY-MM-DDTHH:MM:SS[.fff]`
/// form, which is interpreted as UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Fixed display format used for posts and comments.
pub fn format_display(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Short relative label such as `"5m ago"` or `"3d ago"`.
pub fn relative_label(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// Whole days elapsed between `since` and `now` (never negative).
pub fn days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days().max(0)
}
