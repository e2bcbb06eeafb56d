//! Timestamp extraction from capture file names.
//!
//! Camera traps name snapshots with an embedded `YYYYMMDDHHMMSS` stamp
//! (e.g. `vermont/snapshots/20220614224500-108-snapshot.jpg`). A capture
//! without an extractable timestamp stays ungrouped until one is assigned,
//! so absence here is an `Option`, not an error.

use std::sync::OnceLock;

use chrono::{NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::types::Timestamp;

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{14})").expect("static regex must compile"))
}

/// Extract a UTC timestamp from a 14-digit `YYYYMMDDHHMMSS` run in `path`.
///
/// The first run of 14 digits that parses as a valid datetime wins. Returns
/// `None` if no candidate parses.
pub fn timestamp_from_path(path: &str) -> Option<Timestamp> {
    for candidate in timestamp_pattern().find_iter(path) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(candidate.as_str(), "%Y%m%d%H%M%S") {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn extracts_from_snapshot_filename() {
        let ts = timestamp_from_path("vermont/snapshots/20220614224500-108-snapshot.jpg")
            .expect("timestamp should parse");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2022, 6, 14));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (22, 45, 0));
    }

    #[test]
    fn extracts_from_nested_path() {
        assert!(timestamp_from_path("a/b/c/20230101000000.jpeg").is_some());
    }

    #[test]
    fn skips_invalid_digit_runs() {
        // 14 digits, but month 99 is not a date.
        assert!(timestamp_from_path("20229999999999.jpg").is_none());
    }

    #[test]
    fn no_timestamp_yields_none() {
        assert!(timestamp_from_path("snapshots/untitled.jpg").is_none());
        assert!(timestamp_from_path("").is_none());
    }
}
