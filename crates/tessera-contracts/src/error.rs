//! Error types for the Tessera integrity engine.
//!
//! Only construction, configuration, export and encryption-boundary failures
//! are errors.  Verification outcomes are never errors: they are reported as
//! `bool` or `IntegrityStatus`, and every metric query is total.

use thiserror::Error;

/// The unified error type for the Tessera crates.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// An operation needed the teacher secret and student id, but at least
    /// one of them was not supplied.
    #[error("missing credentials: {reason}")]
    MissingCredentials { reason: String },

    /// Credentials were supplied but the log's genesis record does not match
    /// the genesis hash they derive.  Construction is aborted.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// A genesis-checked construction was attempted on a log with no records.
    #[error("genesis record missing: {reason}")]
    GenesisMissing { reason: String },

    /// The metadata cipher was called without a salt.  Never defaulted.
    #[error("missing salt: {reason}")]
    MissingSalt { reason: String },

    /// The metadata cipher failed to derive a key, encrypt, or decrypt.
    #[error("cipher failure: {reason}")]
    CipherFailed { reason: String },

    /// A session payload could not be read or did not match the wire schema.
    #[error("invalid session payload: {reason}")]
    PayloadInvalid { reason: String },

    /// A thresholds file is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A session could not be rendered to one of its export forms.
    #[error("export failed: {reason}")]
    ExportFailed { reason: String },
}

/// Convenience alias used throughout the Tessera crates.
pub type TesseraResult<T> = Result<T, TesseraError>;
