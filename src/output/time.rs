use chrono::{Local, TimeZone, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Elapsed time of a build or step; running items are measured against `now`.
pub fn fmt_elapsed(started_at: Option<i64>, complete_at: Option<i64>, now: i64) -> String {
    match (started_at, complete_at) {
        (Some(start), Some(end)) => fmt_duration(end - start),
        (Some(start), None) => fmt_duration(now - start),
        (None, _) => "-".to_string(),
    }
}

/// `42s`, `3:07`, or `1:02:03`.
pub fn fmt_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < MINUTE {
        return format!("{seconds}s");
    }

    let (h, rest) = (seconds / HOUR, seconds % HOUR);
    let (m, s) = (rest / MINUTE, rest % MINUTE);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Relative age of a timestamp, falling back to a local date for old ones.
pub fn fmt_age(start: i64, now: i64) -> String {
    let delta = now - start;
    if delta < 5 {
        return "a moment ago".to_string();
    } else if delta < 2 * MINUTE {
        return format!("{delta}s ago");
    } else if delta < HOUR {
        return format!("{}m ago", delta / MINUTE);
    } else if delta < DAY {
        return format!("{}h ago", delta / HOUR);
    }

    let Some(date) = Local.timestamp_opt(start, 0).single() else {
        return "-".to_string();
    };
    if delta < 30 * DAY {
        date.format("%Y-%m-%d %H:%M").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(0), "0s");
        assert_eq!(fmt_duration(59), "59s");
        assert_eq!(fmt_duration(60), "1:00");
        assert_eq!(fmt_duration(187), "3:07");
        assert_eq!(fmt_duration(3723), "1:02:03");
        assert_eq!(fmt_duration(-5), "0s");
    }

    #[test]
    fn test_fmt_elapsed_running() {
        assert_eq!(fmt_elapsed(Some(100), None, 130), "30s");
        assert_eq!(fmt_elapsed(Some(100), Some(220), 9999), "2:00");
        assert_eq!(fmt_elapsed(None, None, 10), "-");
    }

    #[test]
    fn test_fmt_age_relative() {
        let now = 1_700_000_000;
        assert_eq!(fmt_age(now - 2, now), "a moment ago");
        assert_eq!(fmt_age(now - 90, now), "90s ago");
        assert_eq!(fmt_age(now - 600, now), "10m ago");
        assert_eq!(fmt_age(now - 3 * HOUR, now), "3h ago");
    }

    #[test]
    fn test_fmt_age_dates() {
        let now = 1_700_000_000;
        assert_eq!(fmt_age(now - 2 * DAY, now).len(), "2023-11-12 22:13".len());
        assert_eq!(fmt_age(now - 60 * DAY, now).len(), "2023-09-15".len());
    }
}
