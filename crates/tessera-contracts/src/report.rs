//! Derived assessment types.
//!
//! Everything here is produced on demand from a log and thresholds.  None of
//! it is authoritative state; all of it can be recomputed from the chain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{entry::Timestamp, integrity::IntegrityStatus};

/// Severity of a health verdict, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthSeverity {
    Healthy,
    Warning,
    Critical,
}

impl std::fmt::Display for HealthSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// A health verdict: the worst severity reached and every reason that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHealth {
    pub status: HealthSeverity,
    pub reasons: Vec<String>,
}

/// A mesh addition whose vertex count jumped past the running baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexJump {
    /// Position among the non-genesis entries.
    pub index: usize,
    pub timestamp: Timestamp,
    pub object_name: String,
    /// Vertex count recorded on the flagged entry.
    pub vertices: u64,
    /// Rounded mean vertex count of every record before it.
    pub baseline: u64,
}

impl VertexJump {
    /// Vertices above the baseline.
    pub fn excess(&self) -> u64 {
        self.vertices.saturating_sub(self.baseline)
    }
}

/// One point of the sliding-window entropy series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyPoint {
    pub timestamp: Timestamp,
    pub entropy: f64,
}

/// Scene vertex count at one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGrowthPoint {
    pub timestamp: Timestamp,
    pub vertices: u64,
}

/// Dashboard summary of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Non-genesis entries.
    pub total_entries: usize,
    pub total_working_time: f64,
    pub effective_time: f64,
    pub idle_ratio: f64,
    pub avg_idle_time: f64,
    pub total_vertices: u64,
    pub total_objects: u64,
    pub most_active_object: Option<String>,
    pub action_counts: BTreeMap<String, usize>,
    pub score: u32,
    pub flags: Vec<String>,
    pub verdict: String,
    pub entropy_score: f64,
}

/// Everything the engine concludes about one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub integrity: IntegrityStatus,
    pub summary: SessionSummary,
    pub health: SessionHealth,
    pub vertex_jumps: Vec<VertexJump>,
    pub repetitive_bursts: Vec<String>,
    pub entropy_trend: Vec<EntropyPoint>,
}
