//! Analyzer thresholds and score penalties.
//!
//! Every constant the analyzer compares against lives here so that a
//! classroom can tune them from a TOML file without a rebuild.  Missing keys
//! fall back to the defaults below, so an empty document is a valid config.
//!
//! ```toml
//! idle_warning = 0.6
//! max_work_gap = 2400.0
//!
//! [penalties]
//! vertex_jump = 30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tessera_contracts::error::{TesseraError, TesseraResult};

/// Points subtracted from the authenticity score, starting at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Penalties {
    /// Chain integrity is anything but `Valid`.
    pub integrity: u32,
    /// Idle ratio above `idle_warning`.
    pub idle: u32,
    /// At least one suspicious vertex jump.
    pub vertex_jump: u32,
    /// Action entropy below `entropy_warning`.
    pub low_entropy: u32,
    /// No meaningful scene progress.
    pub no_progress: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            integrity: 40,
            idle: 20,
            vertex_jump: 40,
            low_entropy: 20,
            no_progress: 20,
        }
    }
}

/// Tunable analyzer constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Idle ratio above which the session is critical.
    pub idle_critical: f64,
    /// Idle ratio above which the session gets a warning and a penalty.
    pub idle_warning: f64,
    /// Idle ratio below which the session may be declared healthy.
    pub idle_healthy: f64,
    /// Entropy below which action diversity is considered low.
    pub entropy_warning: f64,
    /// Entropy at or above which the session may be declared healthy.
    pub entropy_healthy: f64,
    /// Scene vertex total needed for meaningful progress.
    pub min_vertices: u64,
    /// Entry count needed for meaningful progress.
    pub min_actions: usize,
    /// Run length of identical actions that counts as a burst.  Also the
    /// number of distinct burst actions that raises a health warning.
    pub repetitive_threshold: usize,
    /// Vertices above the prior baseline that flag a mesh addition.
    pub vertex_jump_threshold: u64,
    /// Vertices above the prior baseline that make a jump critical.
    pub severe_jump_threshold: u64,
    /// Baseline above which an entry has a high-complexity context.
    pub high_complexity_threshold: u64,
    /// Gaps longer than this (seconds) are breaks, not working time.
    pub max_work_gap: f64,
    /// Gaps up to this (seconds) count as effective working time.
    pub max_idle_gap: f64,
    /// Entries per window of the entropy trend.
    pub entropy_window: usize,
    pub penalties: Penalties,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            idle_critical: 0.9,
            idle_warning: 0.7,
            idle_healthy: 0.3,
            entropy_warning: 1.2,
            entropy_healthy: 1.5,
            min_vertices: 50,
            min_actions: 20,
            repetitive_threshold: 5,
            vertex_jump_threshold: 500,
            severe_jump_threshold: 2000,
            high_complexity_threshold: 500,
            max_work_gap: 1800.0,
            max_idle_gap: 300.0,
            entropy_window: 10,
            penalties: Penalties::default(),
        }
    }
}

impl Thresholds {
    /// Parse `s` as TOML.  Keys that are not present keep their defaults.
    ///
    /// Returns `TesseraError::ConfigError` if the TOML is malformed, names an
    /// unknown key, or gives a key the wrong type.
    pub fn from_toml_str(s: &str) -> TesseraResult<Self> {
        let thresholds: Self = toml::from_str(s).map_err(|e| TesseraError::ConfigError {
            reason: format!("failed to parse thresholds TOML: {}", e),
        })?;
        thresholds.validate()?;
        debug!(?thresholds, "analyzer thresholds loaded");
        Ok(thresholds)
    }

    /// Read the file at `path` and parse it as TOML thresholds.
    pub fn from_file(path: &Path) -> TesseraResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TesseraError::ConfigError {
            reason: format!("failed to read thresholds file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> TesseraResult<()> {
        if self.entropy_window == 0 {
            return Err(TesseraError::ConfigError {
                reason: "entropy_window must be at least 1".to_string(),
            });
        }
        if self.repetitive_threshold < 2 {
            return Err(TesseraError::ConfigError {
                reason: "repetitive_threshold must be at least 2".to_string(),
            });
        }
        if self.max_idle_gap < 0.0 || self.max_work_gap < 0.0 {
            return Err(TesseraError::ConfigError {
                reason: "gap limits must not be negative".to_string(),
            });
        }
        // Effective time must stay within total working time.
        if self.max_idle_gap > self.max_work_gap {
            return Err(TesseraError::ConfigError {
                reason: format!(
                    "max_idle_gap ({}) must not exceed max_work_gap ({})",
                    self.max_idle_gap, self.max_work_gap
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(Thresholds::from_toml_str("").unwrap(), Thresholds::default());
    }

    #[test]
    fn partial_document_overrides_only_named_keys() {
        let t = Thresholds::from_toml_str(
            r#"
            idle_warning = 0.6
            max_work_gap = 2400.0

            [penalties]
            vertex_jump = 30
            "#,
        )
        .unwrap();

        assert_eq!(t.idle_warning, 0.6);
        assert_eq!(t.max_work_gap, 2400.0);
        assert_eq!(t.penalties.vertex_jump, 30);
        assert_eq!(t.penalties.integrity, 40);
        assert_eq!(t.idle_critical, 0.9);
        assert_eq!(t.entropy_window, 10);
    }

    #[test]
    fn unknown_key_is_a_config_error() {
        let err = Thresholds::from_toml_str("idle_warnings = 0.6").unwrap_err();
        assert!(matches!(err, TesseraError::ConfigError { .. }));
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err = Thresholds::from_toml_str(r#"min_vertices = "fifty""#).unwrap_err();
        assert!(matches!(err, TesseraError::ConfigError { .. }));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = Thresholds::from_toml_str("entropy_window = 0").unwrap_err();
        assert!(err.to_string().contains("entropy_window"));
    }

    #[test]
    fn idle_gap_above_work_gap_is_rejected() {
        let err = Thresholds::from_toml_str("max_idle_gap = 5000.0").unwrap_err();
        assert!(matches!(err, TesseraError::ConfigError { .. }));
        assert!(err.to_string().contains("max_idle_gap"));

        let err = Thresholds::from_toml_str("max_work_gap = 120.0").unwrap_err();
        assert!(matches!(err, TesseraError::ConfigError { .. }));

        let equal = Thresholds::from_toml_str("max_idle_gap = 1800.0").unwrap();
        assert_eq!(equal.max_idle_gap, equal.max_work_gap);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_actions = 12").unwrap();
        writeln!(file, "severe_jump_threshold = 5000").unwrap();

        let t = Thresholds::from_file(file.path()).unwrap();
        assert_eq!(t.min_actions, 12);
        assert_eq!(t.severe_jump_threshold, 5000);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Thresholds::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TesseraError::ConfigError { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
