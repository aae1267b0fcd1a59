//! The metadata encryption boundary.
//!
//! Session metadata (recovery logs, embedded scene properties) is sealed with
//! a password-derived key and a salt before it leaves the capture tool.  The
//! engine only depends on this trait; the cipher behind it is replaceable.

use tessera_contracts::error::TesseraResult;

/// Authenticated, salted encryption of opaque bytes.
///
/// Implementations must:
///
/// - reject an empty `salt` with `TesseraError::MissingSalt` before touching
///   the data, in both directions;
/// - return `TesseraError::CipherFailed` when `sealed` was produced with a
///   different key or salt, or has been altered.
pub trait MetadataCipher: Send + Sync {
    /// Encrypt `plaintext` and return a printable token.
    fn seal(&self, plaintext: &[u8], key: &str, salt: &[u8]) -> TesseraResult<String>;

    /// Decrypt a token produced by `seal` with the same key and salt.
    fn open(&self, sealed: &str, key: &str, salt: &[u8]) -> TesseraResult<Vec<u8>>;
}
