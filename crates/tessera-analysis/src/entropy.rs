//! Action diversity: counts, Shannon entropy, the sliding-window trend, and
//! repetitive bursts.

use std::collections::BTreeMap;

use tessera_contracts::{entry::LogEntry, report::EntropyPoint};

use crate::timing::round2;

/// Occurrences of each action type.
pub fn action_counts(entries: &[LogEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.action_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Base-2 Shannon entropy of the action types in `entries`, rounded to
/// 2 decimals.  Zero for an empty slice.
pub fn shannon_entropy(entries: &[LogEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let total = entries.len() as f64;
    let entropy = action_counts(entries)
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>();
    // `+ 0.0` folds a -0.0 sum into 0.0.
    round2(entropy) + 0.0
}

/// Entropy of each full window of `window` entries.
///
/// The point for position `i` covers `entries[i - window..i]` and carries the
/// timestamp of entry `i`, so the first point appears at `i == window` and
/// partial windows are never emitted.
pub fn entropy_trend(entries: &[LogEntry], window: usize) -> Vec<EntropyPoint> {
    if window == 0 {
        return Vec::new();
    }
    (window..entries.len())
        .map(|i| EntropyPoint {
            timestamp: entries[i].timestamp,
            entropy: shannon_entropy(&entries[i - window..i]),
        })
        .collect()
}

/// Action types that repeat `threshold` times in a row.
///
/// Each action type is reported once, in the order its first burst
/// completed.
pub fn repetitive_bursts(entries: &[LogEntry], threshold: usize) -> Vec<String> {
    let mut bursts: Vec<String> = Vec::new();
    let mut streak = 1;

    for pair in entries.windows(2) {
        if pair[1].action_type == pair[0].action_type {
            streak += 1;
            if streak == threshold && !bursts.contains(&pair[1].action_type) {
                bursts.push(pair[1].action_type.clone());
            }
        } else {
            streak = 1;
        }
    }

    bursts
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use tessera_contracts::entry::{SceneStats, Timestamp};

    use super::*;

    fn actions(names: &[&str]) -> Vec<LogEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| LogEntry {
                timestamp: Timestamp::from_unix_seconds(i as f64),
                action_type: name.to_string(),
                object_name: "Cube".to_string(),
                object_type: "MESH".to_string(),
                details: Map::new(),
                duration: 0.0,
                scene_stats: SceneStats::default(),
                chain_hash: String::new(),
            })
            .collect()
    }

    #[test]
    fn single_action_type_has_zero_entropy() {
        let entries = actions(&["Move"; 7]);
        assert_eq!(shannon_entropy(&entries), 0.0);
        assert!(shannon_entropy(&entries).is_sign_positive());
        assert_eq!(shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn four_equally_frequent_types_have_entropy_two() {
        let entries = actions(&["A", "B", "C", "D", "A", "B", "C", "D"]);
        assert_eq!(shannon_entropy(&entries), 2.0);
    }

    #[test]
    fn entropy_is_rounded_to_two_decimals() {
        // p = 1/3, 2/3 → 0.918...
        assert_eq!(shannon_entropy(&actions(&["A", "B", "B"])), 0.92);
    }

    #[test]
    fn counts_group_by_action() {
        let counts = action_counts(&actions(&["A", "B", "A"]));
        assert_eq!(counts.get("A"), Some(&2));
        assert_eq!(counts.get("B"), Some(&1));
    }

    #[test]
    fn trend_emits_only_full_windows() {
        let names: Vec<&str> = (0..13).map(|i| if i < 10 { "A" } else { "B" }).collect();
        let entries = actions(&names);
        let trend = entropy_trend(&entries, 10);

        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].timestamp, entries[10].timestamp);
        assert_eq!(trend[0].entropy, 0.0);
        // Window [1, 11) holds nine A and one B.
        assert_eq!(trend[1].entropy, 0.47);

        assert!(entropy_trend(&entries[..10], 10).is_empty());
    }

    #[test]
    fn burst_is_reported_once_per_action() {
        let entries = actions(&["A", "A", "A", "A", "A", "A", "B", "A", "A", "A", "A", "A"]);
        assert_eq!(repetitive_bursts(&entries, 5), vec!["A".to_string()]);
    }

    #[test]
    fn burst_counts_from_the_first_entry() {
        assert_eq!(repetitive_bursts(&actions(&["A"; 5]), 5), vec!["A".to_string()]);
        assert!(repetitive_bursts(&actions(&["A"; 4]), 5).is_empty());
    }

    #[test]
    fn interrupted_runs_reset() {
        let entries = actions(&["A", "A", "A", "B", "A", "A", "A"]);
        assert!(repetitive_bursts(&entries, 5).is_empty());
    }
}
