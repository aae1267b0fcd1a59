//! The session log: a genesis header plus the student's entries.
//!
//! The genesis record is held apart from the entries instead of living at
//! index 0, so every metric works on `entries()` without skipping anything.
//! Wire order is restored by `records()` and `to_wire()`.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map};
use tracing::{debug, info, warn};

use tessera_contracts::{
    credentials::Credentials,
    entry::{
        LogEntry, RawLogEntry, SceneStats, Timestamp, GENESIS_ACTION, GENESIS_OBJECT_NAME,
        SYSTEM_OBJECT_TYPE,
    },
    error::{TesseraError, TesseraResult},
    integrity::IntegrityStatus,
    session::{LogPeriod, SessionId, SessionPayload},
};

use crate::chain::{chain_integrity, compute_entry_hash, genesis_hash, genesis_integrity};

/// A captured modeling session and the credentials it is checked against.
///
/// Built once from a payload, optionally extended with `append` / `link`,
/// otherwise immutable.  Nothing derived from the records is cached here.
#[derive(Debug, Clone)]
pub struct SessionLog {
    id: SessionId,
    created_at: String,
    period: LogPeriod,
    scene_totals: SceneStats,
    credentials: Option<Credentials>,
    genesis: Option<LogEntry>,
    entries: Vec<LogEntry>,
}

impl SessionLog {
    /// An empty log with no genesis record yet.
    pub fn new(id: SessionId, credentials: Option<Credentials>) -> Self {
        Self {
            id,
            created_at: now_iso8601(),
            period: LogPeriod::default(),
            scene_totals: SceneStats::default(),
            credentials,
            genesis: None,
            entries: Vec::new(),
        }
    }

    /// Start a fresh chain: write the genesis record for `credentials`.
    pub fn open(id: SessionId, credentials: Credentials, at: Timestamp) -> Self {
        let mut details = Map::new();
        details.insert("description".to_string(), json!("Initial genesis log entry"));

        let genesis = LogEntry {
            timestamp: at,
            action_type: GENESIS_ACTION.to_string(),
            object_name: GENESIS_OBJECT_NAME.to_string(),
            object_type: SYSTEM_OBJECT_TYPE.to_string(),
            details,
            duration: 0.0,
            scene_stats: SceneStats::default(),
            chain_hash: genesis_hash(&credentials.secret, &credentials.student_id),
        };

        let mut log = Self::new(id, Some(credentials));
        log.genesis = Some(genesis);
        log
    }

    /// Build a log from a payload without checking the genesis record.
    ///
    /// Credentials embedded in the payload (`secret_key`, `student_id`) are
    /// picked up when both are present.
    pub fn from_payload(payload: SessionPayload) -> Self {
        let SessionPayload {
            id,
            timestamp,
            data,
            period,
            stats,
            secret_key,
            student_id,
            ..
        } = payload;

        let mut records = data.into_iter().map(LogEntry::from);
        let genesis = records.next();
        let entries: Vec<LogEntry> = records.collect();

        debug!(
            entry_count = entries.len(),
            has_genesis = genesis.is_some(),
            "session log ingested"
        );

        Self {
            id: id.map(SessionId).unwrap_or_default(),
            created_at: timestamp.unwrap_or_else(now_iso8601),
            period,
            scene_totals: stats,
            credentials: Credentials::from_parts(secret_key, student_id),
            genesis,
            entries,
        }
    }

    /// Parse a JSON payload (raw export or session document) leniently.
    pub fn from_json(json: &str) -> TesseraResult<Self> {
        let payload: SessionPayload =
            serde_json::from_str(json).map_err(|e| TesseraError::PayloadInvalid {
                reason: format!("failed to parse session JSON: {e}"),
            })?;
        Ok(Self::from_payload(payload))
    }

    /// Build a log and require its genesis record to match the credentials.
    ///
    /// `credentials` takes precedence over any embedded in the payload.
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` when no credentials are available at all.
    /// - `GenesisMissing` when the payload holds no records.
    /// - `InvalidCredentials` when the genesis pointer does not match.
    pub fn initialize(
        payload: SessionPayload,
        credentials: Option<Credentials>,
    ) -> TesseraResult<Self> {
        let mut log = Self::from_payload(payload);
        if let Some(creds) = credentials {
            log.credentials = Some(creds);
        }

        let Some(creds) = log.credentials.as_ref() else {
            return Err(TesseraError::MissingCredentials {
                reason: "a teacher secret and student id are required to check the genesis record"
                    .to_string(),
            });
        };

        let Some(genesis) = log.genesis.as_ref() else {
            return Err(TesseraError::GenesisMissing {
                reason: format!("session '{}' contains no records", log.id),
            });
        };

        if genesis.chain_hash != genesis_hash(&creds.secret, &creds.student_id) {
            warn!(session_id = %log.id, "genesis record does not match credentials");
            return Err(TesseraError::InvalidCredentials {
                reason: format!(
                    "genesis record of session '{}' was not issued for student '{}'",
                    log.id, creds.student_id
                ),
            });
        }

        info!(
            session_id = %log.id,
            entry_count = log.entries.len(),
            "session log initialized"
        );
        Ok(log)
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// ISO-8601 creation time of the session document.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// The period declared by the capturing client.
    pub fn period(&self) -> &LogPeriod {
        &self.period
    }

    /// Session-wide scene totals.
    pub fn scene_totals(&self) -> SceneStats {
        self.scene_totals
    }

    pub fn set_scene_totals(&mut self, totals: SceneStats) {
        self.scene_totals = totals;
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// The genesis record, if the log has any records at all.
    pub fn genesis(&self) -> Option<&LogEntry> {
        self.genesis.as_ref()
    }

    /// Student entries, genesis excluded.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Every record in chain order, genesis first.
    pub fn records(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.genesis.iter().chain(self.entries.iter())
    }

    /// Number of records, genesis included.
    pub fn record_count(&self) -> usize {
        usize::from(self.genesis.is_some()) + self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genesis.is_none()
    }

    /// The last record in chain order.
    pub fn last_record(&self) -> Option<&LogEntry> {
        self.entries.last().or(self.genesis.as_ref())
    }

    fn contains_pointer(&self, chain_hash: &str) -> bool {
        self.records().any(|r| r.chain_hash == chain_hash)
    }

    // ── Mutation ──────────────────────────────────────────────────────────────

    /// Append an already-linked record.
    ///
    /// Returns `false` and leaves the log untouched when a record with the same
    /// chain pointer is already present.  The first record appended to an
    /// empty log becomes the genesis record.
    pub fn append(&mut self, entry: LogEntry) -> bool {
        if self.contains_pointer(&entry.chain_hash) {
            debug!(chain_hash = %entry.chain_hash, "duplicate record ignored");
            return false;
        }
        if self.genesis.is_none() {
            self.genesis = Some(entry);
        } else {
            self.entries.push(entry);
        }
        true
    }

    /// Append a record in wire form.  Same rules as `append`.
    pub fn append_wire(&mut self, raw: RawLogEntry) -> bool {
        self.append(LogEntry::from(raw))
    }

    /// Point `entry` at the current chain head and append it.
    ///
    /// Returns the pointer that was written.  Linking the first record of an
    /// empty log requires credentials, since its pointer is the genesis hash.
    pub fn link(&mut self, mut entry: LogEntry) -> TesseraResult<String> {
        let pointer = match self.last_record() {
            Some(prev) => compute_entry_hash(&prev.to_wire()),
            None => {
                let creds = self.credentials.as_ref().ok_or_else(|| {
                    TesseraError::MissingCredentials {
                        reason: "cannot derive the genesis hash for the first record".to_string(),
                    }
                })?;
                genesis_hash(&creds.secret, &creds.student_id)
            }
        };

        entry.chain_hash = pointer.clone();
        if !self.append(entry) {
            debug!(chain_hash = %pointer, "linked record already present");
        }
        Ok(pointer)
    }

    /// Replace every record, genesis included.
    pub fn replace_records(&mut self, records: Vec<LogEntry>) {
        let mut records = records.into_iter();
        self.genesis = records.next();
        self.entries = records.collect();
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.genesis = None;
        self.entries.clear();
    }

    // ── Integrity ─────────────────────────────────────────────────────────────

    /// The genesis hash the credentials derive, if credentials are known.
    pub fn expected_genesis_hash(&self) -> Option<String> {
        self.credentials
            .as_ref()
            .map(|c| genesis_hash(&c.secret, &c.student_id))
    }

    /// Check only the genesis record.
    pub fn verify_genesis(&self) -> IntegrityStatus {
        let first: Vec<RawLogEntry> = self.genesis.iter().map(LogEntry::to_wire).collect();
        genesis_integrity(&first, self.credentials.as_ref())
    }

    /// Verify every link in the chain.
    pub fn integrity(&self) -> IntegrityStatus {
        chain_integrity(&self.to_wire(), self.credentials.as_ref())
    }

    /// Check one link: against `previous` when given, otherwise against the
    /// expected genesis hash.  Without credentials and without a predecessor
    /// the link cannot hold.
    pub fn verify_entry(&self, entry: &LogEntry, previous: Option<&LogEntry>) -> bool {
        match previous {
            Some(prev) => entry.chain_hash == compute_entry_hash(&prev.to_wire()),
            None => self
                .expected_genesis_hash()
                .is_some_and(|genesis| entry.chain_hash == genesis),
        }
    }

    // ── Export ────────────────────────────────────────────────────────────────

    /// Every record in wire form, genesis first.
    pub fn to_wire(&self) -> Vec<RawLogEntry> {
        self.records().map(LogEntry::to_wire).collect()
    }

    /// Every record in structured form, genesis first.
    pub fn to_structured(&self) -> Vec<LogEntry> {
        self.records().cloned().collect()
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
