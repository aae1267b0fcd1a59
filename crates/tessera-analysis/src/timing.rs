//! Durations and working-time accounting.
//!
//! The `dt` an entry carries is whatever the capture add-on measured, and it
//! is hashed as-is.  Analysis instead measures every gap from the timestamps:
//! whole seconds, never negative, zero for the genesis record.

use tessera_contracts::entry::{LogEntry, Timestamp};

/// Seconds from `previous` to `current`, rounded to whole seconds.
///
/// Zero when the gap is negative or either timestamp is unrepresentable.
pub fn gap_seconds(previous: Timestamp, current: Timestamp) -> f64 {
    match (previous.millis(), current.millis()) {
        (Some(prev), Some(curr)) => {
            let diff = (curr - prev) as f64 / 1000.0;
            if diff > 0.0 {
                diff.round()
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Derived duration of each entry, measured from the record before it.
///
/// The first entry is measured from the genesis record; without one it is 0.
pub fn derive_durations(genesis: Option<&LogEntry>, entries: &[LogEntry]) -> Vec<f64> {
    let mut previous = genesis.map(|g| g.timestamp);
    entries
        .iter()
        .map(|entry| {
            let duration = previous.map_or(0.0, |prev| gap_seconds(prev, entry.timestamp));
            previous = Some(entry.timestamp);
            duration
        })
        .collect()
}

/// Sum of durations, skipping every single gap longer than `max_work_gap`.
pub fn total_working_time(durations: &[f64], max_work_gap: f64) -> f64 {
    durations.iter().filter(|d| **d <= max_work_gap).sum()
}

/// Sum of the short gaps of non-marker entries, rounded to whole seconds.
///
/// `entries` and `durations` run in parallel.
pub fn effective_working_time(entries: &[LogEntry], durations: &[f64], max_idle_gap: f64) -> f64 {
    entries
        .iter()
        .zip(durations)
        .filter(|(entry, d)| !entry.is_session_start() && **d <= max_idle_gap)
        .map(|(_, d)| *d)
        .sum::<f64>()
        .round()
}

/// `(total - effective) / total`, clamped at 0 and rounded to 2 decimals.
///
/// Zero when there is no working time.
pub fn idle_ratio(total: f64, effective: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    round2(((total - effective) / total).max(0.0))
}

/// Gaps between consecutive non-marker entries.
///
/// The first non-marker entry opens the session and has no idle gap of its
/// own, so it is skipped.
pub fn idle_periods(entries: &[LogEntry], durations: &[f64]) -> Vec<f64> {
    entries
        .iter()
        .zip(durations)
        .filter(|(entry, _)| !entry.is_session_start())
        .skip(1)
        .map(|(_, d)| *d)
        .collect()
}

/// Rounded mean of `values`, 0 when empty.
pub fn rounded_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().sum::<f64>() / values.len() as f64).round()
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use tessera_contracts::entry::SceneStats;

    use super::*;

    fn at(seconds: f64, action: &str) -> LogEntry {
        LogEntry {
            timestamp: Timestamp::from_unix_seconds(seconds),
            action_type: action.to_string(),
            object_name: "Cube".to_string(),
            object_type: "MESH".to_string(),
            details: Map::new(),
            duration: 999.0,
            scene_stats: SceneStats::default(),
            chain_hash: String::new(),
        }
    }

    fn session_start(seconds: f64) -> LogEntry {
        LogEntry {
            object_name: "__SESSION__".to_string(),
            object_type: "SYSTEM".to_string(),
            ..at(seconds, "Session Started")
        }
    }

    #[test]
    fn gaps_round_to_whole_seconds() {
        let a = Timestamp::from_unix_seconds(100.0);
        assert_eq!(gap_seconds(a, Timestamp::from_unix_seconds(102.4)), 2.0);
        assert_eq!(gap_seconds(a, Timestamp::from_unix_seconds(102.5)), 3.0);
    }

    #[test]
    fn negative_and_unrepresentable_gaps_are_zero() {
        let a = Timestamp::from_unix_seconds(100.0);
        assert_eq!(gap_seconds(a, Timestamp::from_unix_seconds(50.0)), 0.0);
        assert_eq!(gap_seconds(a, Timestamp::from_unix_seconds(f64::NAN)), 0.0);
    }

    #[test]
    fn durations_ignore_recorded_dt() {
        let genesis = at(1000.0, "Genesis Log");
        let entries = vec![at(1010.0, "A"), at(1015.0, "B"), at(1012.0, "C")];
        assert_eq!(derive_durations(Some(&genesis), &entries), vec![10.0, 5.0, 0.0]);
        assert_eq!(derive_durations(None, &entries), vec![0.0, 5.0, 0.0]);
    }

    #[test]
    fn long_gaps_are_breaks() {
        assert_eq!(total_working_time(&[10.0, 1800.0, 1801.0, 5.0], 1800.0), 1815.0);
    }

    #[test]
    fn effective_time_skips_markers_and_long_gaps() {
        let entries = vec![at(0.0, "A"), session_start(0.0), at(0.0, "B"), at(0.0, "C")];
        let durations = [100.0, 50.0, 301.0, 300.0];
        assert_eq!(effective_working_time(&entries, &durations, 300.0), 400.0);
    }

    #[test]
    fn idle_ratio_bounds() {
        assert_eq!(idle_ratio(0.0, 0.0), 0.0);
        assert_eq!(idle_ratio(100.0, 120.0), 0.0);
        assert_eq!(idle_ratio(300.0, 100.0), 0.67);
    }

    #[test]
    fn idle_periods_skip_markers_and_the_opening_entry() {
        let entries = vec![session_start(0.0), at(0.0, "A"), at(0.0, "B"), at(0.0, "C")];
        let durations = [7.0, 1.0, 2.0, 4.0];
        let idle = idle_periods(&entries, &durations);
        assert_eq!(idle, vec![2.0, 4.0]);
        assert_eq!(rounded_mean(&idle), 3.0);
        assert_eq!(rounded_mean(&[]), 0.0);
    }
}
