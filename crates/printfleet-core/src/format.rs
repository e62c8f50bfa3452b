// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Display formatting for durations, sizes and timestamps.

use chrono::{DateTime, Utc};

use crate::types::QueueItem;

/// Format a duration in seconds as `"1h 30m"` / `"45m"`; `None` is `"--"`.
pub fn format_duration(seconds: Option<i64>) -> String {
    let Some(seconds) = seconds.filter(|s| *s >= 0) else {
        return "--".into();
    };
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Format a byte count using binary units.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Format `ts` relative to `now`: `"just now"`, `"5m ago"`, `"in 2h"`.
///
/// Anything more than a week away is shown as a plain date.
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(ts);
    let future = delta.num_seconds() < 0;
    let secs = delta.num_seconds().unsigned_abs();

    if secs < 60 {
        return "just now".into();
    }
    let amount = if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else if secs < 7 * 86_400 {
        format!("{}d", secs / 86_400)
    } else {
        return ts.format("%Y-%m-%d").to_string();
    };

    if future {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}

/// `"ASAP"` for unscheduled or placeholder times, otherwise the timestamp.
pub fn format_scheduled_time(
    item: &QueueItem,
    now: DateTime<Utc>,
    horizon: Option<chrono::Duration>,
) -> String {
    match item.effective_scheduled_time(now, horizon) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => "ASAP".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(Some(3600)), "1h 0m");
        assert_eq!(format_duration(Some(0)), "0m");
        assert_eq!(format_duration(None), "--");
        assert_eq!(format_duration(Some(5400)), "1h 30m");
        assert_eq!(format_duration(Some(59)), "0m");
        assert_eq!(format_duration(Some(-5)), "--");
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative_time(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_relative_time(now + Duration::minutes(10), now), "in 10m");
        assert_eq!(format_relative_time(now - Duration::days(30), now), "2026-04-10");
    }

    #[test]
    fn scheduled_placeholder_reads_asap() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        let mut item: QueueItem = serde_json::from_value(serde_json::json!({
            "id": 1,
            "status": "pending",
            "archive_id": 1,
            "created_at": "2026-05-01T00:00:00Z"
        }))
        .expect("decode");
        let horizon = Some(Duration::days(180));

        assert_eq!(format_scheduled_time(&item, now, horizon), "ASAP");

        item.scheduled_time = Some(now + Duration::hours(2));
        assert_eq!(format_scheduled_time(&item, now, horizon), "2026-05-10 14:00");

        item.scheduled_time = Some(Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0).unwrap());
        assert_eq!(format_scheduled_time(&item, now, horizon), "ASAP");
        assert_eq!(format_scheduled_time(&item, now, None), "2099-12-31 00:00");
    }

    #[test]
    fn huge_horizon_does_not_overflow() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        let mut item: QueueItem = serde_json::from_value(serde_json::json!({
            "id": 1,
            "status": "pending",
            "archive_id": 1,
            "created_at": "2026-05-01T00:00:00Z"
        }))
        .expect("decode");
        item.scheduled_time = Some(now + Duration::hours(2));

        assert_eq!(
            format_scheduled_time(&item, now, Some(Duration::MAX)),
            "2026-05-10 14:00"
        );
        let config = crate::AppConfig {
            placeholder_horizon_days: Some(100_000_000),
            ..Default::default()
        };
        assert_eq!(
            format_scheduled_time(&item, now, config.placeholder_horizon()),
            "2026-05-10 14:00"
        );
    }
}
