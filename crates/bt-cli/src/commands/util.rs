//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(second|minute|hour)s?\s+ago$").unwrap());

/// Conservative bound for relative times: actions are backdated within a day or two.
const MAX_RELATIVE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Parse a datetime string as either ISO 8601 or a time relative to `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z", "2026-01-15T15:30:00+05:00"
/// - Relative: "90 seconds ago", "10 minutes ago", "2 hours ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '10 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    let seconds = n.saturating_mul(seconds_per_unit);
    if seconds > MAX_RELATIVE_SECONDS {
        anyhow::bail!("Relative time too far back: {n} {}s", &caps[2]);
    }

    Ok(now - Duration::seconds(seconds))
}

/// Resolves an optional `--at` value against `now`, refusing future times.
pub fn resolve_at(at: Option<&str>, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let Some(s) = at else {
        return Ok(now);
    };
    let at = parse_datetime(s, now)?;
    if at > now {
        anyhow::bail!("Time is in the future: {s}");
    }
    Ok(at)
}

/// Formats whole seconds for display: "45s", "12m", "1h 5m".
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0s".to_string();
    }
    let hours = seconds / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if minutes >= 1 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}
