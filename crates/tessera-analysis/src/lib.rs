//! # tessera-analysis
//!
//! Behavioral metrics, authenticity scoring, and health verdicts for a
//! verified session log.
//!
//! ## Overview
//!
//! [`SessionAnalyzer`] borrows a [`SessionLog`](tessera_chain::SessionLog)
//! and answers every question a teacher dashboard asks of it: working and
//! idle time, action diversity, suspicious vertex jumps, repetitive bursts,
//! the authenticity score, and the health verdict.  All constants come from
//! [`Thresholds`], which loads from TOML.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tessera_analysis::{SessionAnalyzer, Thresholds};
//!
//! let thresholds = Thresholds::from_file(Path::new("thresholds.toml"))?;
//! let report = SessionAnalyzer::with_thresholds(&log, thresholds).report();
//! println!("{}: {}", report.health.status, report.summary.verdict);
//! ```

pub mod analyzer;
pub mod anomaly;
pub mod entropy;
pub mod export;
pub mod health;
pub mod thresholds;
pub mod timing;

pub use analyzer::SessionAnalyzer;
pub use thresholds::{Penalties, Thresholds};

// ── Tests ─────────────────────────────────────────────────────────────────────
