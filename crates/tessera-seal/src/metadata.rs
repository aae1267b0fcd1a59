//! JSON metadata on top of a `MetadataCipher`.
//!
//! The capture tool seals JSON objects (recovery logs, scene properties)
//! with the teacher secret as the key and the student id as the salt.

use serde_json::Value;

use tessera_contracts::error::{TesseraError, TesseraResult};

use crate::traits::MetadataCipher;

/// The salt the capture tool uses for a student: the UTF-8 bytes of the id.
pub fn student_salt(student_id: &str) -> Vec<u8> {
    student_id.as_bytes().to_vec()
}

/// Serialize `metadata` to JSON and seal it.
pub fn seal_metadata(
    cipher: &dyn MetadataCipher,
    metadata: &Value,
    key: &str,
    salt: &[u8],
) -> TesseraResult<String> {
    let plaintext = serde_json::to_vec(metadata).map_err(|e| TesseraError::PayloadInvalid {
        reason: format!("failed to serialize metadata: {e}"),
    })?;
    cipher.seal(&plaintext, key, salt)
}

/// Open a sealed token and parse its contents as JSON.
pub fn open_metadata(
    cipher: &dyn MetadataCipher,
    sealed: &str,
    key: &str,
    salt: &[u8],
) -> TesseraResult<Value> {
    let plaintext = cipher.open(sealed, key, salt)?;
    serde_json::from_slice(&plaintext).map_err(|e| TesseraError::PayloadInvalid {
        reason: format!("sealed metadata is not valid JSON: {e}"),
    })
}
