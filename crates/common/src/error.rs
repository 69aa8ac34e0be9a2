//! Error type shared by every ghoststring layer.

use thiserror::Error;

/// Errors produced while deriving keys, encoding, or decoding ghoststring tokens.
///
/// Each variant maps to a short machine-readable code via [`GhostError::code`]:
/// - [`GhostError::InvalidNamespace`] → `invalid_namespace`
/// - [`GhostError::InvalidKey`] → `invalid_key`
/// - [`GhostError::MalformedToken`] → `malformed_token`
/// - [`GhostError::DecryptionFailed`] → `decryption_failed`
/// - [`GhostError::NoPolicyRegistered`] → `no_policy_registered`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GhostError {
    /// The namespace violates the pattern or length rules.
    #[error("invalid namespace {namespace:?}: {reason}")]
    InvalidNamespace {
        /// The rejected namespace.
        namespace: String,
        /// Which rule was violated.
        reason: &'static str,
    },

    /// A passphrase was blank, key bytes had the wrong length, or a key store
    /// ended up with no keys.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The token could not be split into prefix, nonce, namespace and ciphertext.
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    /// No key authenticated the ciphertext.
    ///
    /// Wrong key, tampered ciphertext and a rewritten namespace all collapse
    /// into this one variant.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Decoding was requested for a namespace with no registered policy.
    #[error("no ghostifyer registered for namespace {0:?}")]
    NoPolicyRegistered(String),

    /// Strict decoding found a token embedded under a different namespace.
    #[error("token namespace {found:?} does not match expected namespace {expected:?}")]
    NamespaceMismatch {
        /// Namespace the caller asked for.
        expected: String,
        /// Namespace embedded in the token.
        found: String,
    },

    /// The password-based key derivation function failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The AEAD seal operation failed.
    #[error("encryption failed")]
    EncryptionFailed,
}

impl GhostError {
    /// Returns the short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            GhostError::InvalidNamespace { .. } => "invalid_namespace",
            GhostError::InvalidKey(_) => "invalid_key",
            GhostError::MalformedToken(_) => "malformed_token",
            GhostError::DecryptionFailed => "decryption_failed",
            GhostError::NoPolicyRegistered(_) => "no_policy_registered",
            GhostError::NamespaceMismatch { .. } => "namespace_mismatch",
            GhostError::KeyDerivation(_) => "key_derivation",
            GhostError::EncryptionFailed => "encryption_failed",
        }
    }

    pub(crate) fn invalid_namespace(namespace: &str, reason: &'static str) -> Self {
        GhostError::InvalidNamespace {
            namespace: namespace.to_owned(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(GhostError::DecryptionFailed.code(), "decryption_failed");
        assert_eq!(
            GhostError::MalformedToken("x").code(),
            "malformed_token"
        );
        assert_eq!(
            GhostError::NoPolicyRegistered("ns".into()).code(),
            "no_policy_registered"
        );
        assert_eq!(
            GhostError::invalid_namespace("1x", "bad").code(),
            "invalid_namespace"
        );
    }

    #[test]
    fn display_includes_namespace() {
        let e = GhostError::NoPolicyRegistered("billing.eu".into());
        assert!(e.to_string().contains("billing.eu"));
    }

    #[test]
    fn decryption_failure_carries_no_detail() {
        assert_eq!(GhostError::DecryptionFailed.to_string(), "decryption failed");
    }
}
