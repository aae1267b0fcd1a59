//! Shared, lock-guarded access to a `SessionLog`.
//!
//! `SharedSessionLog` gives the single-writer / multiple-reader discipline the
//! engine needs when a log is appended to while other threads verify or
//! analyze it: appends take the write lock, everything else a read lock.
//! Readers therefore never observe a half-applied append.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use tessera_contracts::{
    entry::LogEntry,
    error::TesseraResult,
    integrity::IntegrityStatus,
};

use crate::log::SessionLog;

/// A cloneable handle to one session log.
///
/// Clones share the same log.
#[derive(Debug, Clone)]
pub struct SharedSessionLog {
    inner: Arc<RwLock<SessionLog>>,
}

impl SharedSessionLog {
    pub fn new(log: SessionLog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(log)),
        }
    }

    /// Run `f` against the current log under a read lock.
    ///
    /// Every analysis query goes through here so that it sees one consistent
    /// snapshot of the records.
    pub fn read<R>(&self, f: impl FnOnce(&SessionLog) -> R) -> R {
        // The log is never left half-written, so a poisoned lock is still safe
        // to read through.
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Append an already-linked record.  See `SessionLog::append`.
    pub fn append(&self, entry: LogEntry) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.append(entry)
    }

    /// Link and append a record.  See `SessionLog::link`.
    pub fn link(&self, entry: LogEntry) -> TesseraResult<String> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.link(entry)
    }

    /// Verify the whole chain under a read lock.
    pub fn verify_integrity(&self) -> IntegrityStatus {
        self.read(|log| {
            let status = log.integrity();
            info!(
                session_id = %log.id(),
                record_count = log.record_count(),
                integrity = %status,
                "session chain verified"
            );
            status
        })
    }

    /// A detached copy of the current log.
    pub fn snapshot(&self) -> SessionLog {
        self.read(SessionLog::clone)
    }
}

impl From<SessionLog> for SharedSessionLog {
    fn from(log: SessionLog) -> Self {
        Self::new(log)
    }
}
