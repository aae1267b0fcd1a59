//! `SessionAnalyzer`: behavioral metrics over one session log.
//!
//! The analyzer borrows the log, verifies the genesis record and the chain
//! once, and derives the
//! per-entry durations once.  Every other metric is computed on demand from
//! the records, so two analyzers over the same log always agree.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use tessera_chain::SessionLog;
use tessera_contracts::{
    entry::{LogEntry, Timestamp},
    integrity::IntegrityStatus,
    report::{EntropyPoint, SceneGrowthPoint, VertexJump},
    session::LogPeriod,
};

use crate::{anomaly, entropy, thresholds::Thresholds, timing};

/// Read-only metrics view of a `SessionLog`.
///
/// Queries operate on the student entries; the genesis record only takes
/// part as the starting point of the first duration and as a prior record
/// of every vertex baseline.
#[derive(Debug, Clone)]
pub struct SessionAnalyzer<'a> {
    log: &'a SessionLog,
    thresholds: Thresholds,
    integrity: IntegrityStatus,
    genesis_status: IntegrityStatus,
    durations: Vec<f64>,
}

impl<'a> SessionAnalyzer<'a> {
    /// Analyze `log` with the default thresholds.
    pub fn new(log: &'a SessionLog) -> Self {
        Self::with_thresholds(log, Thresholds::default())
    }

    pub fn with_thresholds(log: &'a SessionLog, thresholds: Thresholds) -> Self {
        let integrity = log.integrity();
        let genesis_status = log.verify_genesis();
        let durations = timing::derive_durations(log.genesis(), log.entries());
        debug!(
            session_id = %log.id(),
            entry_count = log.entries().len(),
            %integrity,
            %genesis_status,
            "session analyzer ready"
        );
        Self {
            log,
            thresholds,
            integrity,
            genesis_status,
            durations,
        }
    }

    pub fn log(&self) -> &'a SessionLog {
        self.log
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    fn entries(&self) -> &'a [LogEntry] {
        self.log.entries()
    }

    // ── Integrity ─────────────────────────────────────────────────────────────

    /// Chain integrity, verified once when the analyzer was built.
    pub fn integrity(&self) -> IntegrityStatus {
        self.integrity
    }

    /// Genesis-record status, verified once when the analyzer was built.
    pub fn genesis_status(&self) -> IntegrityStatus {
        self.genesis_status
    }

    /// True unless both the genesis record and the chain are known to be
    /// `Valid`.  A log with no records has a vacuously valid chain but no
    /// genesis record, so it counts as tampered.
    pub fn has_tampering_indicators(&self) -> bool {
        !self.genesis_status.is_valid() || !self.integrity.is_valid()
    }

    // ── Time & activity ───────────────────────────────────────────────────────

    /// Derived duration of each entry, parallel to `log.entries()`.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Derived duration of each record in chain order, genesis first at 0.
    pub fn record_durations(&self) -> Vec<f64> {
        let genesis = self.log.genesis().map(|_| 0.0);
        genesis.into_iter().chain(self.durations.iter().copied()).collect()
    }

    /// Working time in seconds, breaks longer than `max_work_gap` excluded.
    pub fn total_working_time(&self) -> f64 {
        timing::total_working_time(&self.durations, self.thresholds.max_work_gap)
    }

    /// Seconds spent in gaps no longer than `max_idle_gap`.
    pub fn effective_working_time(&self) -> f64 {
        timing::effective_working_time(
            self.entries(),
            &self.durations,
            self.thresholds.max_idle_gap,
        )
    }

    /// Share of working time not spent in short gaps, in `[0, 1]`.
    pub fn idle_ratio(&self) -> f64 {
        timing::idle_ratio(self.total_working_time(), self.effective_working_time())
    }

    pub fn idle_periods(&self) -> Vec<f64> {
        timing::idle_periods(self.entries(), &self.durations)
    }

    pub fn average_idle_time(&self) -> f64 {
        timing::rounded_mean(&self.idle_periods())
    }

    /// First and last entry timestamps, or `None` without entries.
    pub fn working_period(&self) -> Option<LogPeriod> {
        let first = self.entries().first()?;
        let last = self.entries().last()?;
        Some(LogPeriod {
            start: first.timestamp.to_iso8601(),
            end: last.timestamp.to_iso8601(),
        })
    }

    /// Total derived duration per action type.
    pub fn action_durations(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for (entry, d) in self.entries().iter().zip(&self.durations) {
            *totals.entry(entry.action_type.clone()).or_insert(0.0) += d;
        }
        totals
    }

    /// Entries sorted by derived duration, longest first.  Ties keep log
    /// order.
    pub fn actions_by_longest_duration(&self) -> Vec<&'a LogEntry> {
        let mut ranked: Vec<(f64, &'a LogEntry)> = self
            .durations
            .iter()
            .copied()
            .zip(self.entries())
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Entries per minute, keyed by `YYYY-MM-DDTHH:MM` (UTC).
    pub fn action_density_per_minute(&self) -> BTreeMap<String, usize> {
        let mut buckets = BTreeMap::new();
        for entry in self.entries() {
            let iso = entry.timestamp.to_iso8601();
            let Some(minute) = iso.get(..16) else {
                continue;
            };
            *buckets.entry(minute.to_string()).or_insert(0) += 1;
        }
        buckets
    }

    // ── Log queries ───────────────────────────────────────────────────────────

    pub fn logs_by_action_type(&self, action_type: &str) -> Vec<&'a LogEntry> {
        self.entries()
            .iter()
            .filter(|e| e.action_type == action_type)
            .collect()
    }

    pub fn logs_by_object_name(&self, name: &str) -> Vec<&'a LogEntry> {
        self.entries().iter().filter(|e| e.object_name == name).collect()
    }

    pub fn logs_by_object_type(&self, object_type: &str) -> Vec<&'a LogEntry> {
        self.entries()
            .iter()
            .filter(|e| e.object_type == object_type)
            .collect()
    }

    /// Entries with `start <= timestamp <= end`, compared at millisecond
    /// resolution.
    pub fn logs_in_time_range(&self, start: Timestamp, end: Timestamp) -> Vec<&'a LogEntry> {
        let (Some(start), Some(end)) = (start.millis(), end.millis()) else {
            return Vec::new();
        };
        self.entries()
            .iter()
            .filter(|e| e.timestamp.millis().is_some_and(|t| t >= start && t <= end))
            .collect()
    }

    /// Distinct object names in order of first appearance.
    pub fn unique_objects(&self) -> Vec<&'a str> {
        let mut seen: Vec<&'a str> = Vec::new();
        for entry in self.entries() {
            if !seen.contains(&entry.object_name.as_str()) {
                seen.push(&entry.object_name);
            }
        }
        seen
    }

    pub fn object_action_count(&self, name: &str) -> usize {
        self.entries().iter().filter(|e| e.object_name == name).count()
    }

    /// The object acted on most often.  Ties go to the object seen first.
    pub fn most_active_object(&self) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in self.entries() {
            *counts.entry(&entry.object_name).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for name in self.unique_objects() {
            let count = counts.get(name).copied().unwrap_or(0);
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((name, count));
            }
        }
        best.map(|(name, _)| name.to_string())
    }

    // ── Scene statistics ──────────────────────────────────────────────────────

    /// Session-wide vertex total.
    pub fn total_vertices(&self) -> u64 {
        self.log.scene_totals().vertex
    }

    /// Session-wide object total.
    pub fn total_objects(&self) -> u64 {
        self.log.scene_totals().object
    }

    /// Session vertex total per record, rounded.  Zero for an empty log.
    pub fn average_vertices(&self) -> u64 {
        per_record(self.total_vertices(), self.log.record_count())
    }

    /// Session object total per record, rounded.  Zero for an empty log.
    pub fn average_objects(&self) -> u64 {
        per_record(self.total_objects(), self.log.record_count())
    }

    /// Baseline vertex count for entry `index`.
    pub fn average_vertices_prior(&self, index: usize) -> u64 {
        anomaly::average_vertices_prior(self.log.genesis(), self.entries(), index)
    }

    /// True when the baseline before entry `index` already exceeds
    /// `high_complexity_threshold`.
    pub fn has_high_complexity_context(&self, index: usize) -> bool {
        self.average_vertices_prior(index) > self.thresholds.high_complexity_threshold
    }

    /// Vertex count at each entry.
    pub fn scene_growth(&self) -> Vec<SceneGrowthPoint> {
        self.entries()
            .iter()
            .map(|e| SceneGrowthPoint {
                timestamp: e.timestamp,
                vertices: e.scene_stats.vertex,
            })
            .collect()
    }

    /// Enough vertices and enough records to count as real work.  The
    /// record count includes the genesis record.
    pub fn has_meaningful_progress(&self) -> bool {
        self.total_vertices() >= self.thresholds.min_vertices
            && self.log.record_count() >= self.thresholds.min_actions
    }

    // ── Anomalies ─────────────────────────────────────────────────────────────

    pub fn vertex_jumps(&self) -> Vec<VertexJump> {
        anomaly::vertex_jumps(
            self.log.genesis(),
            self.entries(),
            self.thresholds.vertex_jump_threshold,
        )
    }

    pub fn has_suspicious_vertex_jump(&self, index: usize) -> bool {
        self.entries().get(index).is_some_and(|entry| {
            entry.is_mesh_addition()
                && entry.scene_stats.vertex
                    > self
                        .average_vertices_prior(index)
                        .saturating_add(self.thresholds.vertex_jump_threshold)
        })
    }

    // ── Action diversity ──────────────────────────────────────────────────────

    pub fn action_counts(&self) -> BTreeMap<String, usize> {
        entropy::action_counts(self.entries())
    }

    pub fn action_entropy(&self) -> f64 {
        entropy::shannon_entropy(self.entries())
    }

    pub fn entropy_trend(&self) -> Vec<EntropyPoint> {
        entropy::entropy_trend(self.entries(), self.thresholds.entropy_window)
    }

    pub fn repetitive_bursts(&self) -> Vec<String> {
        entropy::repetitive_bursts(self.entries(), self.thresholds.repetitive_threshold)
    }
}

fn per_record(total: u64, records: usize) -> u64 {
    if records == 0 {
        return 0;
    }
    (total as f64 / records as f64).round() as u64
}
