//! Gap-based timestamp clustering for monitoring sessions.
//!
//! A monitoring session ("event") is a maximal run of capture timestamps
//! where each successive gap is strictly less than a configurable threshold.
//! The repository/pipeline layer feeds this the distinct, sorted timestamps
//! of a deployment and turns each group into an event row.

use chrono::Duration;

use crate::types::Timestamp;

/// Default maximum gap between two captures of the same session, in minutes.
///
/// Nocturnal camera traps typically capture all night with multi-hour
/// daylight gaps between sessions, so two hours separates sessions cleanly.
pub const DEFAULT_MAX_TIME_GAP_MINUTES: i64 = 120;

/// The default maximum time gap as a [`Duration`].
pub fn default_max_time_gap() -> Duration {
    Duration::minutes(DEFAULT_MAX_TIME_GAP_MINUTES)
}

/// Partition sorted timestamps into maximal runs separated by gaps of at
/// least `max_gap`.
///
/// Two adjacent timestamps belong to the same group iff their delta is
/// strictly less than `max_gap`. The input must be sorted ascending; the
/// output preserves order. Empty input yields zero groups.
pub fn group_timestamps_by_gap(
    timestamps: &[Timestamp],
    max_gap: Duration,
) -> Vec<Vec<Timestamp>> {
    let mut groups: Vec<Vec<Timestamp>> = Vec::new();
    let mut current: Vec<Timestamp> = Vec::new();

    for &ts in timestamps {
        match current.last() {
            Some(&prev) if ts - prev >= max_gap => {
                groups.push(std::mem::take(&mut current));
                current.push(ts);
            }
            _ => current.push(ts),
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2023, 6, 15, h, m, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_timestamps_by_gap(&[], default_max_time_gap()).is_empty());
    }

    #[test]
    fn single_timestamp_is_one_group() {
        let groups = group_timestamps_by_gap(&[ts(22, 0)], default_max_time_gap());
        assert_eq!(groups, vec![vec![ts(22, 0)]]);
    }

    #[test]
    fn captures_within_gap_share_a_group() {
        let input = [ts(21, 0), ts(21, 30), ts(22, 59)];
        let groups = group_timestamps_by_gap(&input, default_max_time_gap());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn gap_of_exactly_max_gap_splits() {
        // The comparison is strict: a delta equal to max_gap starts a new group.
        let input = [ts(10, 0), ts(12, 0)];
        let groups = group_timestamps_by_gap(&input, default_max_time_gap());
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn two_sessions_with_midday_gap() {
        // Captures at 10:00, 10:05 and 13:00 with a 120 minute gap produce
        // two sessions: {10:00, 10:05} and {13:00}.
        let input = [ts(10, 0), ts(10, 5), ts(13, 0)];
        let groups = group_timestamps_by_gap(&input, default_max_time_gap());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![ts(10, 0), ts(10, 5)]);
        assert_eq!(groups[1], vec![ts(13, 0)]);
    }

    #[test]
    fn adjacent_pairs_obey_the_gap_law() {
        let input = [ts(1, 0), ts(2, 30), ts(3, 0), ts(6, 0), ts(6, 1)];
        let max_gap = default_max_time_gap();
        let groups = group_timestamps_by_gap(&input, max_gap);

        // Rebuild pairwise adjacency and check membership against the gap.
        let mut group_of = std::collections::HashMap::new();
        for (i, group) in groups.iter().enumerate() {
            for &t in group {
                group_of.insert(t, i);
            }
        }
        for pair in input.windows(2) {
            let same_group = group_of[&pair[0]] == group_of[&pair[1]];
            assert_eq!(same_group, pair[1] - pair[0] < max_gap);
        }
    }
}
