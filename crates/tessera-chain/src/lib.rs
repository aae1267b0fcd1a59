//! # tessera-chain
//!
//! Genesis-anchored SHA-256 hash chain for modeling-session logs.
//!
//! ## Overview
//!
//! Every record stores, in `ph`, the canonical hash of the record before it.
//! The first record instead stores a genesis hash derived from the teacher
//! secret and the student id, which binds the whole log to one student.
//! Changing any byte of any hashed field breaks the next link, and
//! `verify_chain` detects it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_chain::SessionLog;
//! use tessera_contracts::credentials::Credentials;
//!
//! let log = SessionLog::initialize(payload, Some(Credentials::new(secret, student_id)))?;
//! assert!(log.integrity().is_valid());
//! ```

pub mod canonical;
pub mod chain;
pub mod log;
pub mod shared;

pub use canonical::canonical_entry_json;
pub use chain::{
    chain_integrity, compute_entry_hash, first_broken_link, genesis_hash, verify_chain,
    verify_entry,
};
pub use log::SessionLog;
pub use shared::SharedSessionLog;

// ── Tests ─────────────────────────────────────────────────────────────────────
