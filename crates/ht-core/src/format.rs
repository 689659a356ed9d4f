//! Display helpers for durations, timestamps and window titles.

use chrono::{DateTime, TimeZone, Utc};

use crate::forest::Forest;

/// Formats milliseconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24, and negative input renders as zero.
pub fn format_duration(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Renders a timestamp in the given time zone, e.g. `2026-01-01 09:00:00`.
pub fn format_timestamp<Tz>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Title for the host window: the most recently started running entry and
/// its live duration, or `default` when nothing is running.
pub fn window_title(forest: &Forest, default: &str) -> String {
    forest
        .most_recently_started_running()
        .map_or_else(
            || default.to_string(),
            |entry| format!("{} – {}", entry.title, format_duration(entry.duration_ms)),
        )
}
