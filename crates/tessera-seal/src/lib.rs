//! # tessera-seal
//!
//! Salted authenticated encryption for session metadata.
//!
//! [`MetadataCipher`] is the boundary; [`ChaChaMetadataCipher`] is the
//! implementation the CLI uses.  An empty salt is always a hard error.
//!
//! ```rust,ignore
//! use tessera_seal::{open_metadata, seal_metadata, student_salt, ChaChaMetadataCipher};
//!
//! let cipher = ChaChaMetadataCipher::new();
//! let token = seal_metadata(&cipher, &json!({"logs": []}), secret, &student_salt(id))?;
//! let back = open_metadata(&cipher, &token, secret, &student_salt(id))?;
//! ```

pub mod chacha;
pub mod metadata;
pub mod traits;

pub use chacha::ChaChaMetadataCipher;
pub use metadata::{open_metadata, seal_metadata, student_salt};
pub use traits::MetadataCipher;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use tessera_contracts::error::TesseraError;

    use super::*;

    #[test]
    fn test_metadata_round_trip() {
        let cipher = ChaChaMetadataCipher::new();
        let salt = student_salt("stu-001");
        let metadata = json!({
            "student_id": "stu-001",
            "logs": [{ "a": "Added Mesh", "s": { "v": 8 } }]
        });

        let token = seal_metadata(&cipher, &metadata, "teacher-secret", &salt).unwrap();
        assert!(!token.contains("Added Mesh"));

        let opened = open_metadata(&cipher, &token, "teacher-secret", &salt).unwrap();
        assert_eq!(opened, metadata);
    }

    #[test]
    fn test_missing_salt_is_fatal() {
        let cipher = ChaChaMetadataCipher::new();
        let err = seal_metadata(&cipher, &json!({}), "k", &student_salt("")).unwrap_err();
        assert!(matches!(err, TesseraError::MissingSalt { .. }));
        assert!(err.to_string().starts_with("missing salt"));
    }

    #[test]
    fn test_non_json_plaintext_is_rejected() {
        let cipher = ChaChaMetadataCipher::new();
        let token = cipher.seal(b"not json", "k", b"salt").unwrap();
        let err = open_metadata(&cipher, &token, "k", b"salt").unwrap_err();
        assert!(matches!(err, TesseraError::PayloadInvalid { .. }));
    }

    #[test]
    fn test_cipher_is_object_safe() {
        let boxed: Box<dyn MetadataCipher> = Box::new(ChaChaMetadataCipher::new());
        let token = boxed.seal(b"x", "k", b"s").unwrap();
        assert_eq!(boxed.open(&token, "k", b"s").unwrap(), b"x");
    }
}
