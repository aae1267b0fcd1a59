//! Verifier-held credentials.
//!
//! The teacher secret never appears in a chain.  Only the genesis hash derived
//! from it is stored, at position 0.

use serde::{Deserialize, Serialize};

/// A teacher secret paired with a student identifier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub secret: String,
    pub student_id: String,
}

impl Credentials {
    pub fn new(secret: impl Into<String>, student_id: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            student_id: student_id.into(),
        }
    }

    /// Build credentials only when both parts are present and non-empty.
    pub fn from_parts(secret: Option<String>, student_id: Option<String>) -> Option<Self> {
        match (secret, student_id) {
            (Some(secret), Some(student_id)) if !secret.is_empty() && !student_id.is_empty() => {
                Some(Self { secret, student_id })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret", &"<redacted>")
            .field("student_id", &self.student_id)
            .finish()
    }
}
