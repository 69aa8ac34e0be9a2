//! [`KeyStore`]: the derived keys of one namespace, newest first.

use common::GhostError;
use tracing::debug;

use super::key::TimestampedKey;
use crate::crypto::{derive_key, DerivedKey};

/// A derived key together with the timestamp of the passphrase it came from.
#[derive(Clone, Debug)]
pub struct StoredKey {
    /// Epoch milliseconds of the source passphrase.
    pub timestamp: i64,
    /// The derived AES-256 key.
    pub key: DerivedKey,
}

/// Immutable collection of derived keys for exactly one namespace.
///
/// Every key is derived at construction, so a bad passphrase fails at startup
/// rather than on the first request. Once built the store is never mutated;
/// rotation means building a new store with the new key added. It can be
/// shared across threads without locking.
#[derive(Clone, Debug)]
pub enum KeyStore {
    /// One key, used for both encryption and decryption.
    Single(DerivedKey),
    /// Several keys sorted by timestamp, newest first. Never empty.
    Multi(Vec<StoredKey>),
}

impl KeyStore {
    /// Build a single-key store from one passphrase.
    ///
    /// # Errors
    ///
    /// Propagates any [`derive_key`] error.
    pub fn single(namespace: &str, passphrase: &str) -> Result<Self, GhostError> {
        Ok(KeyStore::Single(derive_key(namespace, passphrase)?))
    }

    /// Build a multi-key store, deriving every passphrase eagerly.
    ///
    /// Keys are ordered newest first; ties keep their input order.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidKey`] if `keys` is empty, and fails the
    /// whole construction if any single key fails to derive.
    pub fn new(namespace: &str, keys: Vec<TimestampedKey>) -> Result<Self, GhostError> {
        if keys.is_empty() {
            return Err(GhostError::InvalidKey(format!(
                "no keys found for namespace {namespace:?}"
            )));
        }

        let derived = keys
            .iter()
            .map(|tk| {
                Ok(StoredKey {
                    timestamp: tk.timestamp,
                    key: derive_key(namespace, &tk.key)?,
                })
            })
            .collect::<Result<Vec<_>, GhostError>>()?;

        debug!(namespace, keys = derived.len(), "derived key store");
        Self::from_stored(derived)
    }

    /// Build a multi-key store from keys derived elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidKey`] if `keys` is empty.
    pub fn from_derived(keys: Vec<(i64, DerivedKey)>) -> Result<Self, GhostError> {
        Self::from_stored(
            keys.into_iter()
                .map(|(timestamp, key)| StoredKey { timestamp, key })
                .collect(),
        )
    }

    fn from_stored(mut keys: Vec<StoredKey>) -> Result<Self, GhostError> {
        if keys.is_empty() {
            return Err(GhostError::InvalidKey("key store has no keys".into()));
        }
        // `sort_by` is stable, so equal timestamps keep their input order.
        keys.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(KeyStore::Multi(keys))
    }

    /// The key new values are encrypted under.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidKey`] if the store holds no keys, which
    /// the constructors never allow.
    pub fn latest(&self) -> Result<&DerivedKey, GhostError> {
        match self {
            KeyStore::Single(key) => Ok(key),
            KeyStore::Multi(keys) => keys
                .first()
                .map(|stored| &stored.key)
                .ok_or_else(|| GhostError::InvalidKey("no keys available".into())),
        }
    }

    /// Every key, newest first, in the order decryption should try them.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidKey`] if the store holds no keys.
    pub fn all(&self) -> Result<Vec<&DerivedKey>, GhostError> {
        let keys: Vec<&DerivedKey> = match self {
            KeyStore::Single(key) => vec![key],
            KeyStore::Multi(keys) => keys.iter().map(|stored| &stored.key).collect(),
        };
        if keys.is_empty() {
            return Err(GhostError::InvalidKey("no keys available".into()));
        }
        Ok(keys)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        match self {
            KeyStore::Single(_) => 1,
            KeyStore::Multi(keys) => keys.len(),
        }
    }

    /// Always `false` for a store built through the public constructors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
