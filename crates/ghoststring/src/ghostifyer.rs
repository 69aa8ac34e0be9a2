//! Per-namespace encoding policies.
//!
//! The set of policies is closed: AES-256-GCM over a [`KeyStore`] (one key or
//! several), or the null policy used when a namespace has no key at all.

use std::sync::Arc;

use common::{protocol, validate_namespace, Envelope, GhostError};
use tracing::warn;

use crate::crypto::cipher;
use crate::ghost_string::GhostString;
use crate::keystore::KeyStore;

/// The encode/decode policy bound to one namespace.
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone, Debug)]
pub enum Ghostifyer {
    /// AES-256-GCM with a fresh random nonce per value.
    Aes256Gcm(Aes256GcmGhostifyer),
    /// No key configured: encodes to `""` and decodes to the empty value.
    Null,
}

/// AES-256-GCM policy over a shared, immutable [`KeyStore`].
#[derive(Clone, Debug)]
pub struct Aes256GcmGhostifyer {
    namespace: String,
    keys: Arc<KeyStore>,
}

impl Ghostifyer {
    /// Policy with a single key derived from `passphrase`.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidNamespace`] or [`GhostError::InvalidKey`]
    /// for bad input.
    pub fn single_key(namespace: &str, passphrase: &str) -> Result<Self, GhostError> {
        Self::multi_key(namespace, KeyStore::single(namespace, passphrase)?)
    }

    /// Policy over a (possibly multi-key) store. The store's newest key
    /// encrypts; every key is tried when decrypting.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidNamespace`] if `namespace` is invalid.
    pub fn multi_key(namespace: &str, keys: KeyStore) -> Result<Self, GhostError> {
        validate_namespace(namespace)?;
        Ok(Ghostifyer::Aes256Gcm(Aes256GcmGhostifyer {
            namespace: namespace.to_owned(),
            keys: Arc::new(keys),
        }))
    }

    /// The null policy.
    pub fn null() -> Self {
        Ghostifyer::Null
    }

    /// Namespace this policy is bound to; empty for [`Ghostifyer::Null`].
    pub fn namespace(&self) -> &str {
        match self {
            Ghostifyer::Aes256Gcm(g) => &g.namespace,
            Ghostifyer::Null => "",
        }
    }

    /// Encode `value` as a token.
    ///
    /// An invalid or empty value encodes to `""` without error.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::EncryptionFailed`] if sealing fails.
    pub fn ghostify(&self, value: &GhostString) -> Result<String, GhostError> {
        match self {
            Ghostifyer::Aes256Gcm(g) => g.ghostify(value),
            Ghostifyer::Null => Ok(String::new()),
        }
    }

    /// Decode `token` back into a value.
    ///
    /// `""` and a bare prefix decode to [`GhostString::empty`].
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::MalformedToken`] if the token cannot be split and
    /// [`GhostError::DecryptionFailed`] if no key authenticates it.
    pub fn unghostify(&self, token: &str) -> Result<GhostString, GhostError> {
        match self {
            Ghostifyer::Aes256Gcm(g) => g.unghostify(token),
            Ghostifyer::Null => Ok(GhostString::empty()),
        }
    }
}

impl Aes256GcmGhostifyer {
    /// Number of keys decryption may try.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    fn ghostify(&self, value: &GhostString) -> Result<String, GhostError> {
        if !value.is_valid() {
            return Ok(String::new());
        }

        let key = self.keys.latest()?;
        let nonce = cipher::generate_nonce();
        let ciphertext = cipher::seal(key, &nonce, value.value().as_bytes())?;

        Envelope {
            nonce,
            namespace: value.namespace().to_owned(),
            ciphertext,
        }
        .encode()
    }

    fn unghostify(&self, token: &str) -> Result<GhostString, GhostError> {
        if protocol::is_empty_token(token) {
            return Ok(GhostString::empty());
        }

        let envelope = Envelope::decode(token)?;
        let keys = self.keys.all()?;

        for key in &keys {
            if let Ok(plaintext) = cipher::open(key, &envelope.nonce, &envelope.ciphertext) {
                let value = String::from_utf8(plaintext)
                    .map_err(|_| GhostError::MalformedToken("plaintext is not valid UTF-8"))?;
                return Ok(GhostString::new(envelope.namespace, value));
            }
        }

        warn!(
            namespace = %self.namespace,
            keys_tried = keys.len(),
            "no key authenticated token"
        );
        Err(GhostError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DerivedKey, KEY_LEN};
    use common::{NONCE_LEN, PREFIX, TAG_LEN};

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_slice(&[byte; KEY_LEN]).unwrap()
    }

    fn ghostifyer(namespace: &str, keys: Vec<(i64, DerivedKey)>) -> Ghostifyer {
        Ghostifyer::multi_key(namespace, KeyStore::from_derived(keys).unwrap()).unwrap()
    }

    #[test]
    fn round_trip() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        let value = GhostString::new("test", "maybe");
        let token = g.ghostify(&value).unwrap();
        assert!(token.starts_with(PREFIX));
        assert_eq!(g.unghostify(&token).unwrap(), value);
    }

    #[test]
    fn payload_has_expected_minimum_size() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        let token = g.ghostify(&GhostString::new("test", "maybe")).unwrap();
        let envelope = Envelope::decode(&token).unwrap();
        assert_eq!(envelope.nonce.len(), NONCE_LEN);
        assert_eq!(envelope.namespace, "test");
        assert_eq!(envelope.ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn invalid_values_encode_to_empty() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        assert_eq!(g.ghostify(&GhostString::empty()).unwrap(), "");
        assert_eq!(g.ghostify(&GhostString::new("test", "")).unwrap(), "");
        assert_eq!(g.ghostify(&GhostString::new("1bad", "x")).unwrap(), "");
    }

    #[test]
    fn empty_tokens_decode_to_empty() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        assert_eq!(g.unghostify("").unwrap(), GhostString::empty());
        assert_eq!(g.unghostify(PREFIX).unwrap(), GhostString::empty());
    }

    #[test]
    fn same_value_twice_gives_different_tokens() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        let value = GhostString::new("test", "maybe");
        assert_ne!(g.ghostify(&value).unwrap(), g.ghostify(&value).unwrap());
    }

    #[test]
    fn old_tokens_survive_rotation() {
        let old = ghostifyer("test", vec![(100, key(1))]);
        let token = old.ghostify(&GhostString::new("test", "pointy")).unwrap();

        let rotated = ghostifyer("test", vec![(100, key(1)), (200, key(2))]);
        assert_eq!(rotated.unghostify(&token).unwrap().value(), "pointy");

        // New tokens are sealed under the newest key only.
        let fresh = rotated.ghostify(&GhostString::new("test", "daisy")).unwrap();
        assert!(old.unghostify(&fresh).is_err());
        let newest_only = ghostifyer("test", vec![(200, key(2))]);
        assert_eq!(newest_only.unghostify(&fresh).unwrap().value(), "daisy");
    }

    #[test]
    fn foreign_key_fails_with_decryption_error() {
        let a = ghostifyer("alpha", vec![(1, key(1))]);
        let b = ghostifyer("alpha", vec![(1, key(2))]);
        let token = a.ghostify(&GhostString::new("alpha", "same")).unwrap();
        assert_eq!(b.unghostify(&token), Err(GhostError::DecryptionFailed));
    }

    #[test]
    fn flipped_ciphertext_byte_fails() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        let token = g.ghostify(&GhostString::new("test", "maybe")).unwrap();
        let mut envelope = Envelope::decode(&token).unwrap();
        envelope.ciphertext[0] ^= 0x01;
        assert_eq!(
            g.unghostify(&envelope.encode().unwrap()),
            Err(GhostError::DecryptionFailed)
        );
    }

    #[test]
    fn rewritten_namespace_still_decrypts_under_same_key() {
        // The namespace is not bound into the AEAD; only the key is.
        let g = ghostifyer("test", vec![(1, key(1))]);
        let token = g.ghostify(&GhostString::new("test", "maybe")).unwrap();
        let mut envelope = Envelope::decode(&token).unwrap();
        envelope.namespace = "other".into();
        let decoded = g.unghostify(&envelope.encode().unwrap()).unwrap();
        assert_eq!(decoded.namespace(), "other");
    }

    #[test]
    fn malformed_token_is_reported() {
        let g = ghostifyer("test", vec![(1, key(1))]);
        assert!(matches!(
            g.unghostify("\u{1F47B}:AAAA"),
            Err(GhostError::MalformedToken(_))
        ));
    }

    #[test]
    fn null_policy() {
        let g = Ghostifyer::null();
        assert_eq!(g.namespace(), "");
        assert_eq!(g.ghostify(&GhostString::new("test", "maybe")).unwrap(), "");
        assert_eq!(g.unghostify("anything").unwrap(), GhostString::empty());
    }

    #[test]
    fn multi_key_rejects_invalid_namespace() {
        let store = KeyStore::from_derived(vec![(1, key(1))]).unwrap();
        assert!(matches!(
            Ghostifyer::multi_key(" test", store),
            Err(GhostError::InvalidNamespace { .. })
        ));
    }
}
