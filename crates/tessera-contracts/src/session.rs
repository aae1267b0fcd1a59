//! Session-level payload types: what crosses the ingest and export
//! boundaries around a log.

use serde::{Deserialize, Serialize};

use crate::entry::{null_as_default, RawLogEntry, SceneStats};

/// Identifier of one captured session.
///
/// Payloads normally carry their own id.  When one does not, a fresh
/// `session-<uuid>` id is generated on ingest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Create a new, unique session id.
    pub fn new() -> Self {
        Self(format!("session-{}", uuid::Uuid::new_v4().simple()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The declared working period, as ISO-8601 strings.
///
/// Either side may be empty when the capturing client had fewer than two
/// records to measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPeriod {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
}

/// Integrity label attached to a raw export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainStatus {
    Valid,
    Tampered,
}

/// A session payload in wire form.
///
/// One type covers both shapes the capture tooling produces:
///
/// - the raw export (`data`, `status`, `total_working_time`, `period`,
///   `stats`), and
/// - the session document (`id`, `timestamp`, `period`,
///   `total_working_time`, `data`, `stats`, optionally `secret_key` and
///   `student_id`).
///
/// Every field except `data` is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// ISO-8601 creation time of the session document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// All records in chain order; the first one is the genesis record.
    pub data: Vec<RawLogEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChainStatus>,

    /// Working time in seconds.  Informational on ingest; always recomputed
    /// from the records on export.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_working_time: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub period: LogPeriod,

    /// Session-wide scene totals.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: SceneStats,

    /// Accepted on input for compatibility with older documents.  Never
    /// written on export.
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,

    /// Accepted on input for compatibility with older documents.  Never
    /// written on export.
    #[serde(default, skip_serializing)]
    pub student_id: Option<String>,
}
