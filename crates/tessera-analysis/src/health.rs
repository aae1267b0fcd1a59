//! Scoring and verdicts: authenticity score, suspicious-pattern flags,
//! the health verdict, and the bundled summary and report.

use tracing::{debug, info};

use tessera_contracts::report::{
    HealthSeverity, SessionHealth, SessionReport, SessionSummary,
};

use crate::analyzer::SessionAnalyzer;

pub const REASON_INTEGRITY: &str = "Log integrity issues detected";
pub const REASON_MESH_IMPORTS: &str = "Potential mesh imports detected";
pub const REASON_NO_ACTIVITY: &str = "No student activity recorded";
pub const REASON_EXCESSIVE_IDLE: &str = "Excessive idle time";
pub const REASON_HIGH_IDLE: &str = "High idle time";
pub const REASON_LOW_DIVERSITY: &str = "Low action diversity";
pub const REASON_LOW_PROGRESS: &str = "Low scene progress despite activity";
pub const REASON_BURSTS: &str = "Repetitive action bursts detected";
pub const REASON_HEALTHY: &str = "Student shows consistent and diverse activity";
pub const REASON_NEUTRAL: &str = "All metrics are within acceptable thresholds";

pub const VERDICT_AUTHENTIC: &str = "Authentic work with consistent effort.";
pub const VERDICT_MINOR_CONCERNS: &str = "Mostly authentic with minor concerns.";
pub const VERDICT_ISSUES: &str = "Potential integrity or effort issues detected.";

/// Collects reasons and tracks the worst severity seen.
struct Verdict {
    status: HealthSeverity,
    reasons: Vec<String>,
}

impl Verdict {
    fn new() -> Self {
        Self {
            status: HealthSeverity::Healthy,
            reasons: Vec::new(),
        }
    }

    fn escalate(&mut self, severity: HealthSeverity, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(%severity, reason = %reason, "health check fired");
        self.status = self.status.max(severity);
        self.reasons.push(reason);
    }
}

impl SessionAnalyzer<'_> {
    /// 100 minus the configured penalties, floored at 0.
    pub fn authenticity_score(&self) -> u32 {
        let t = self.thresholds();
        let p = t.penalties;
        let mut penalty = 0;

        if self.has_tampering_indicators() {
            penalty += p.integrity;
        }
        if self.idle_ratio() > t.idle_warning {
            penalty += p.idle;
        }
        if !self.vertex_jumps().is_empty() {
            penalty += p.vertex_jump;
        }
        if self.action_entropy() < t.entropy_warning {
            penalty += p.low_entropy;
        }
        if !self.has_meaningful_progress() {
            penalty += p.no_progress;
        }

        100u32.saturating_sub(penalty)
    }

    /// Human-readable flags for the teacher dashboard.
    pub fn suspicious_patterns(&self) -> Vec<String> {
        let t = self.thresholds();
        let mut flags = Vec::new();

        if self.action_entropy() < t.entropy_warning {
            flags.push(REASON_LOW_DIVERSITY.to_string());
        }
        if self.idle_ratio() > t.idle_critical {
            flags.push(REASON_EXCESSIVE_IDLE.to_string());
        }
        let jumps = self.vertex_jumps().len();
        if jumps > 0 {
            flags.push(format!("Suspicious vertex jumps detected ({jumps})"));
        }
        if !self.repetitive_bursts().is_empty() {
            flags.push(REASON_BURSTS.to_string());
        }
        if !self.has_meaningful_progress() {
            flags.push("Low scene progress".to_string());
        }
        if self.has_tampering_indicators() {
            flags.push("Log integrity issues".to_string());
        }

        flags
    }

    /// One-line verdict from the number of flags raised.
    pub fn assessment_verdict(&self) -> &'static str {
        match self.suspicious_patterns().len() {
            0 => VERDICT_AUTHENTIC,
            1..=2 => VERDICT_MINOR_CONCERNS,
            _ => VERDICT_ISSUES,
        }
    }

    /// Health verdict: every reason that fired, and the worst severity.
    pub fn health(&self) -> SessionHealth {
        let t = self.thresholds();
        let idle = self.idle_ratio();
        let entropy = self.action_entropy();
        let vertices = self.total_vertices();
        let actions = self.log().entries().len();

        let mut verdict = Verdict::new();

        // Critical
        if self.has_tampering_indicators() {
            verdict.escalate(HealthSeverity::Critical, REASON_INTEGRITY);
        }
        let jumps = self.vertex_jumps();
        if !jumps.is_empty() {
            let severe = jumps
                .iter()
                .filter(|j| j.excess() > t.severe_jump_threshold)
                .map(|j| j.vertices)
                .max();
            match severe {
                Some(max) => verdict.escalate(
                    HealthSeverity::Critical,
                    format!("Extremely high-poly import detected ({max} vertices)"),
                ),
                None => verdict.escalate(HealthSeverity::Warning, REASON_MESH_IMPORTS),
            }
        }
        if actions == 0 {
            verdict.escalate(HealthSeverity::Critical, REASON_NO_ACTIVITY);
        }
        if idle > t.idle_critical {
            verdict.escalate(HealthSeverity::Critical, REASON_EXCESSIVE_IDLE);
        }

        // Warning
        if idle > t.idle_warning {
            verdict.escalate(HealthSeverity::Warning, REASON_HIGH_IDLE);
        }
        if entropy < t.entropy_warning {
            verdict.escalate(HealthSeverity::Warning, REASON_LOW_DIVERSITY);
        }
        if vertices < t.min_vertices && actions >= t.min_actions {
            verdict.escalate(HealthSeverity::Warning, REASON_LOW_PROGRESS);
        }
        if self.repetitive_bursts().len() >= t.repetitive_threshold {
            verdict.escalate(HealthSeverity::Warning, REASON_BURSTS);
        }

        // Healthy
        if verdict.reasons.is_empty() {
            if idle < t.idle_healthy && entropy >= t.entropy_healthy && vertices >= t.min_vertices {
                verdict.escalate(HealthSeverity::Healthy, REASON_HEALTHY);
            } else {
                verdict.reasons.push(REASON_NEUTRAL.to_string());
            }
        }

        SessionHealth {
            status: verdict.status,
            reasons: verdict.reasons,
        }
    }

    /// Dashboard summary bundle.
    pub fn summary(&self) -> SessionSummary {
        let flags = self.suspicious_patterns();
        SessionSummary {
            total_entries: self.log().entries().len(),
            total_working_time: self.total_working_time(),
            effective_time: self.effective_working_time(),
            idle_ratio: self.idle_ratio(),
            avg_idle_time: self.average_idle_time(),
            total_vertices: self.total_vertices(),
            total_objects: self.total_objects(),
            most_active_object: self.most_active_object(),
            action_counts: self.action_counts(),
            score: self.authenticity_score(),
            verdict: self.assessment_verdict().to_string(),
            flags,
            entropy_score: self.action_entropy(),
        }
    }

    /// Integrity, summary, health, and the anomaly details behind them.
    pub fn report(&self) -> SessionReport {
        let report = SessionReport {
            session_id: self.log().id().to_string(),
            integrity: self.integrity(),
            summary: self.summary(),
            health: self.health(),
            vertex_jumps: self.vertex_jumps(),
            repetitive_bursts: self.repetitive_bursts(),
            entropy_trend: self.entropy_trend(),
        };
        info!(
            session_id = %report.session_id,
            integrity = %report.integrity,
            health = %report.health.status,
            score = report.summary.score,
            "session report built"
        );
        report
    }
}
