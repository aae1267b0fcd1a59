//! Vertex-jump detection.
//!
//! A mesh addition that lands far above the complexity the scene had so far
//! is the signature of an imported asset.  The baseline for entry `i` is the
//! rounded mean vertex count of every record before it, genesis included.

use tessera_contracts::{entry::LogEntry, report::VertexJump};

/// Rounded mean vertex count of the records before entry `index`.
///
/// `index` addresses `entries`; the genesis record, when present, counts as
/// a prior record of every entry.  Zero when nothing precedes the entry.
pub fn average_vertices_prior(
    genesis: Option<&LogEntry>,
    entries: &[LogEntry],
    index: usize,
) -> u64 {
    let prior = genesis
        .into_iter()
        .chain(entries.iter().take(index))
        .map(|record| record.scene_stats.vertex);

    let (sum, count) = prior.fold((0u128, 0u128), |(sum, count), v| {
        (sum + u128::from(v), count + 1)
    });
    if count == 0 {
        return 0;
    }
    let mean = (sum as f64 / count as f64).round();
    mean as u64
}

/// Every mesh addition whose vertex count exceeds its baseline by more than
/// `threshold`.
pub fn vertex_jumps(
    genesis: Option<&LogEntry>,
    entries: &[LogEntry],
    threshold: u64,
) -> Vec<VertexJump> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_mesh_addition())
        .filter_map(|(index, entry)| {
            let baseline = average_vertices_prior(genesis, entries, index);
            let vertices = entry.scene_stats.vertex;
            (vertices > baseline.saturating_add(threshold)).then(|| VertexJump {
                index,
                timestamp: entry.timestamp,
                object_name: entry.object_name.clone(),
                vertices,
                baseline,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use tessera_contracts::entry::{SceneStats, Timestamp};

    use super::*;

    fn record(action: &str, object_type: &str, vertices: u64) -> LogEntry {
        LogEntry {
            timestamp: Timestamp::from_unix_seconds(0.0),
            action_type: action.to_string(),
            object_name: "Obj".to_string(),
            object_type: object_type.to_string(),
            details: Map::new(),
            duration: 0.0,
            scene_stats: SceneStats {
                vertex: vertices,
                face: 0,
                object: 1,
            },
            chain_hash: String::new(),
        }
    }

    #[test]
    fn baseline_includes_genesis() {
        let genesis = record("Genesis Log", "SYSTEM", 0);
        let entries = vec![record("Edit", "MESH", 100), record("Edit", "MESH", 200)];

        assert_eq!(average_vertices_prior(Some(&genesis), &entries, 0), 0);
        assert_eq!(average_vertices_prior(Some(&genesis), &entries, 1), 50);
        assert_eq!(average_vertices_prior(Some(&genesis), &entries, 2), 100);
        assert_eq!(average_vertices_prior(None, &entries, 0), 0);
        assert_eq!(average_vertices_prior(None, &entries, 2), 150);
    }

    #[test]
    fn only_mesh_additions_can_jump() {
        let genesis = record("Genesis Log", "SYSTEM", 0);
        let entries = vec![
            record("Edit", "MESH", 100),
            record("Added Mesh", "CURVE", 5000),
            record("Edited Mesh", "MESH", 5000),
            record("Added Mesh", "MESH", 5000),
        ];
        let jumps = vertex_jumps(Some(&genesis), &entries, 500);
        assert_eq!(jumps.len(), 1);
        assert_eq!(jumps[0].index, 3);
        assert_eq!(jumps[0].baseline, 2525);
        assert_eq!(jumps[0].excess(), 2475);
    }

    #[test]
    fn jump_must_exceed_baseline_plus_threshold() {
        let genesis = record("Genesis Log", "SYSTEM", 100);
        let at_limit = vec![record("Added Mesh", "MESH", 600)];
        assert!(vertex_jumps(Some(&genesis), &at_limit, 500).is_empty());

        let over = vec![record("Added Mesh", "MESH", 601)];
        assert_eq!(vertex_jumps(Some(&genesis), &over, 500).len(), 1);
    }
}
