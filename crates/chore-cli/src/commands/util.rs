//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").expect("relative time regex is valid")
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Resolves an optional `--at` argument to a Unix timestamp in seconds.
///
/// The CLI is the only place the clock is read; the core only ever sees the
/// resulting integer.
pub fn resolve_timestamp(at: Option<&str>) -> anyhow::Result<i64> {
    let now = Utc::now();
    let when = match at {
        Some(s) => parse_datetime_from(s.trim(), now)?,
        None => now,
    };
    Ok(when.timestamp())
}

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago",
///   measured back from `now`
pub fn parse_datetime_from(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    // Try ISO 8601 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    let duration = Duration::minutes(n * minutes_per_unit);
    Ok(now - duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse_datetime_from("2026-01-14T08:30:00+02:00", fixed_now()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-14T06:30:00+00:00");
    }

    #[test]
    fn parses_relative_times() {
        let now = fixed_now();
        assert_eq!(
            parse_datetime_from("2 hours ago", now).unwrap(),
            now - Duration::hours(2)
        );
        assert_eq!(
            parse_datetime_from("1 day ago", now).unwrap(),
            now - Duration::days(1)
        );
        assert_eq!(
            parse_datetime_from("3 weeks ago", now).unwrap(),
            now - Duration::weeks(3)
        );
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_datetime_from("yesterday-ish", fixed_now()).unwrap_err();
        assert!(err.to_string().contains("Invalid datetime"));
    }

    #[test]
    fn rejects_oversized_relative_values() {
        let err = parse_datetime_from("99999999999 weeks ago", fixed_now()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn resolve_timestamp_uses_unix_seconds() {
        let ts = resolve_timestamp(Some("2026-01-15T10:00:00Z")).unwrap();
        assert_eq!(ts, 1_768_471_200);
    }
}
