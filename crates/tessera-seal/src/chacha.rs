//! ChaCha20-Poly1305 implementation of `MetadataCipher`.
//!
//! Token layout: `base64(nonce || ciphertext || tag)` with a random 12-byte
//! nonce per seal.  The 32-byte key is HKDF-SHA256 over the hex SHA-256 of
//! the password, salted with the caller's salt.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use tessera_contracts::error::{TesseraError, TesseraResult};

use crate::traits::MetadataCipher;

/// Nonce size for ChaCha20-Poly1305.
const NONCE_SIZE: usize = 12;
/// Key size for ChaCha20-Poly1305.
const KEY_SIZE: usize = 32;
/// HKDF context string.
const KEY_INFO: &[u8] = b"tessera-metadata-seal-v1";

/// The default metadata cipher.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaMetadataCipher;

impl ChaChaMetadataCipher {
    pub fn new() -> Self {
        Self
    }

    fn cipher(key: &str, salt: &[u8]) -> TesseraResult<ChaCha20Poly1305> {
        let derived = derive_key(key, salt)?;
        ChaCha20Poly1305::new_from_slice(&derived).map_err(|e| TesseraError::CipherFailed {
            reason: format!("failed to create cipher: {e}"),
        })
    }
}

impl MetadataCipher for ChaChaMetadataCipher {
    fn seal(&self, plaintext: &[u8], key: &str, salt: &[u8]) -> TesseraResult<String> {
        require_salt(salt, "encrypt")?;
        let cipher = Self::cipher(key, salt)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes).map_err(|e| TesseraError::CipherFailed {
            reason: format!("failed to generate nonce: {e}"),
        })?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| TesseraError::CipherFailed {
                reason: format!("encryption failed: {e}"),
            })?;

        let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);

        debug!(plaintext_len = plaintext.len(), "metadata sealed");
        Ok(STANDARD.encode(token))
    }

    fn open(&self, sealed: &str, key: &str, salt: &[u8]) -> TesseraResult<Vec<u8>> {
        require_salt(salt, "decrypt")?;

        let data = STANDARD
            .decode(sealed.trim())
            .map_err(|e| TesseraError::CipherFailed {
                reason: format!("sealed token is not valid base64: {e}"),
            })?;
        if data.len() < NONCE_SIZE {
            return Err(TesseraError::CipherFailed {
                reason: "sealed token is too short".to_string(),
            });
        }

        let cipher = Self::cipher(key, salt)?;
        let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                warn!("metadata token failed authentication");
                TesseraError::CipherFailed {
                    reason: "decryption failed: wrong key or salt, or the token was altered"
                        .to_string(),
                }
            })
    }
}

fn require_salt(salt: &[u8], operation: &str) -> TesseraResult<()> {
    if salt.is_empty() {
        return Err(TesseraError::MissingSalt {
            reason: format!("cannot {operation} metadata without a salt"),
        });
    }
    Ok(())
}

fn derive_key(key: &str, salt: &[u8]) -> TesseraResult<[u8; KEY_SIZE]> {
    let hashed = hex::encode(Sha256::digest(key.as_bytes()));
    let hk = Hkdf::<Sha256>::new(Some(salt), hashed.as_bytes());
    let mut derived = [0u8; KEY_SIZE];
    hk.expand(KEY_INFO, &mut derived)
        .map_err(|_| TesseraError::CipherFailed {
            reason: "key derivation failed".to_string(),
        })?;
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "teacher-secret";
    const SALT: &[u8] = b"stu-001";

    #[test]
    fn seal_then_open() {
        let cipher = ChaChaMetadataCipher::new();
        let sealed = cipher.seal(b"scene metadata", KEY, SALT).unwrap();
        assert_eq!(cipher.open(&sealed, KEY, SALT).unwrap(), b"scene metadata");
    }

    #[test]
    fn nonces_differ_between_seals() {
        let cipher = ChaChaMetadataCipher::new();
        let a = cipher.seal(b"same", KEY, SALT).unwrap();
        let b = cipher.seal(b"same", KEY, SALT).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_salt_is_rejected_both_ways() {
        let cipher = ChaChaMetadataCipher::new();
        let err = cipher.seal(b"x", KEY, b"").unwrap_err();
        assert!(matches!(err, TesseraError::MissingSalt { .. }));

        let sealed = cipher.seal(b"x", KEY, SALT).unwrap();
        let err = cipher.open(&sealed, KEY, &[]).unwrap_err();
        assert!(matches!(err, TesseraError::MissingSalt { .. }));
    }

    #[test]
    fn wrong_key_or_salt_fails() {
        let cipher = ChaChaMetadataCipher::new();
        let sealed = cipher.seal(b"x", KEY, SALT).unwrap();

        let err = cipher.open(&sealed, "other", SALT).unwrap_err();
        assert!(matches!(err, TesseraError::CipherFailed { .. }));
        let err = cipher.open(&sealed, KEY, b"stu-002").unwrap_err();
        assert!(matches!(err, TesseraError::CipherFailed { .. }));
    }

    #[test]
    fn altered_or_garbage_tokens_fail() {
        let cipher = ChaChaMetadataCipher::new();
        let sealed = cipher.seal(b"payload", KEY, SALT).unwrap();

        let mut bytes = STANDARD.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let altered = STANDARD.encode(bytes);
        assert!(cipher.open(&altered, KEY, SALT).is_err());

        assert!(cipher.open("not base64!", KEY, SALT).is_err());
        assert!(cipher.open("AAAA", KEY, SALT).is_err());
    }
}
