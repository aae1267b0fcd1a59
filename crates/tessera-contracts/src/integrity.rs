//! Tri-state result of a chain integrity check.

use serde::{Deserialize, Serialize};

/// Outcome of verifying a chain against credentials.
///
/// `Indeterminate` means the check could not run because credentials were
/// absent.  It must never be read as `Valid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityStatus {
    Valid,
    Invalid,
    Indeterminate,
}

impl IntegrityStatus {
    /// Map a completed boolean verification onto the tri-state.
    pub fn from_verified(verified: bool) -> Self {
        if verified {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

impl std::fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Indeterminate => "indeterminate",
        };
        f.write_str(label)
    }
}
