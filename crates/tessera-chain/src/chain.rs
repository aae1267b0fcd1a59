//! Hash-chain primitives: entry hashing, genesis derivation, and chain
//! verification.
//!
//! Link rules:
//!
//!   entry[0].ph == genesis_hash(secret, student_id)
//!   entry[i].ph == compute_entry_hash(entry[i - 1])      for i >= 1
//!
//! `compute_entry_hash` hashes the canonical form described in
//! [`crate::canonical`].  Verification never errors: a broken link is `false`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use tessera_contracts::{
    credentials::Credentials, entry::RawLogEntry, integrity::IntegrityStatus,
};

use crate::canonical::canonical_entry_json;

/// SHA-256 of `data`, as a lower-case 64-character hex string.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Canonical content hash of one entry, its own `ph` excluded.
pub fn compute_entry_hash(entry: &RawLogEntry) -> String {
    sha256_hex(canonical_entry_json(entry))
}

/// The required `ph` of the genesis record:
/// `sha256_hex(base64(secret + ":" + student_id))`.
pub fn genesis_hash(secret: &str, student_id: &str) -> String {
    let combined = format!("{secret}:{student_id}");
    sha256_hex(STANDARD.encode(combined.as_bytes()))
}

/// Check one link.
///
/// With a predecessor, `entry.ph` must equal the predecessor's canonical hash;
/// without one, it must equal `genesis`.
pub fn verify_entry(entry: &RawLogEntry, previous: Option<&RawLogEntry>, genesis: &str) -> bool {
    match previous {
        Some(prev) => entry.ph == compute_entry_hash(prev),
        None => entry.ph == genesis,
    }
}

/// Verify a complete chain against the genesis derived from the credentials.
///
/// Returns `false` the moment any link is broken.  An empty chain is valid.
pub fn verify_chain(entries: &[RawLogEntry], secret: &str, student_id: &str) -> bool {
    first_broken_link(entries, &genesis_hash(secret, student_id)).is_none()
}

/// Index of the first record whose pointer does not hold, if any.
pub fn first_broken_link(entries: &[RawLogEntry], genesis: &str) -> Option<usize> {
    let first = entries.first()?;

    if first.ph != genesis {
        warn!("genesis hash mismatch");
        return Some(0);
    }
    debug!("genesis hash matched");

    // Single pass: hash each record once, compare it to the next pointer.
    let mut expected_prev = compute_entry_hash(first);
    for (index, entry) in entries.iter().enumerate().skip(1) {
        if entry.ph != expected_prev {
            warn!(index, "chain hash mismatch");
            return Some(index);
        }
        expected_prev = compute_entry_hash(entry);
    }

    None
}

/// Verify a chain when credentials may be absent.
///
/// Without credentials the result is `Indeterminate`, never `Valid`.
pub fn chain_integrity(
    entries: &[RawLogEntry],
    credentials: Option<&Credentials>,
) -> IntegrityStatus {
    match credentials {
        Some(creds) => {
            IntegrityStatus::from_verified(verify_chain(entries, &creds.secret, &creds.student_id))
        }
        None => {
            debug!("no credentials supplied; integrity is indeterminate");
            IntegrityStatus::Indeterminate
        }
    }
}

/// Check only the genesis record.
///
/// `Invalid` for an empty chain, `Indeterminate` without credentials.
pub fn genesis_integrity(
    entries: &[RawLogEntry],
    credentials: Option<&Credentials>,
) -> IntegrityStatus {
    let Some(creds) = credentials else {
        return IntegrityStatus::Indeterminate;
    };
    match entries.first() {
        Some(first) => IntegrityStatus::from_verified(
            first.ph == genesis_hash(&creds.secret, &creds.student_id),
        ),
        None => IntegrityStatus::Invalid,
    }
}
