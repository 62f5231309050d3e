//! Signature policy inputs
//!
//! Verifying signatures is the caller's job; the installer only consumes the
//! verdict and the policy that says what to do with it.

use serde::{Deserialize, Serialize};

/// Security policy for signature enforcement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Reject packages without a verified signature
    pub only_signed: bool,
}

impl SecurityPolicy {
    #[must_use]
    pub fn only_signed() -> Self {
        Self { only_signed: true }
    }
}

/// Outcome of verifying a package signature
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SignatureVerdict {
    Verified,
    #[default]
    Unsigned,
    Invalid { reason: String },
}
