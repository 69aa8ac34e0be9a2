//! Timestamped keys, the per-namespace key store, and loading keys from the
//! environment.
//!
//! # Lifecycle
//!
//! 1. At startup, keys for a namespace are read either from explicit
//!    [`TimestampedKey`] values or from `GHOSTSTRING_KEY_<NS>_*` environment
//!    variables ([`KeyStore::from_env`]).
//! 2. Every passphrase is run through Argon2id immediately; any failure aborts
//!    construction.
//! 3. The resulting [`KeyStore`] is immutable. The newest key encrypts, every
//!    key is tried (newest first) when decrypting.
//!
//! # Security invariants
//!
//! - Passphrases and derived keys are **never** logged or included in errors.
//! - Derived keys are zeroed when the store is dropped.

pub mod key;
pub mod store;

pub use key::TimestampedKey;
pub use store::{KeyStore, StoredKey};

use common::GhostError;
use tracing::debug;

/// Prefix shared by every key variable; the namespace and a free suffix follow.
pub const ENV_KEY_PREFIX: &str = "GHOSTSTRING_KEY_";

/// Environment variable prefix holding keys for `namespace`.
///
/// The namespace is upper-cased and `-`/`.` become `_`, so `test.local` reads
/// `GHOSTSTRING_KEY_TEST_LOCAL_*`. Namespaces differing only in case or in
/// `-`/`.`/`_` share a prefix; [`crate::Config`] refuses to load such pairs.
pub fn env_key_prefix(namespace: &str) -> String {
    format!(
        "{ENV_KEY_PREFIX}{}_",
        namespace.to_ascii_uppercase().replace(['-', '.'], "_")
    )
}

/// `true` if variable `name` holds a key for the namespace with `prefix`.
///
/// The suffix after the prefix must be non-empty and free of `_`, so the keys
/// of `test.local` (`GHOSTSTRING_KEY_TEST_LOCAL_A`) are not read for `test`.
fn is_key_variable(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|suffix| !suffix.is_empty() && !suffix.contains('_'))
}

impl KeyStore {
    /// Build a multi-key store for `namespace` from the process environment.
    ///
    /// Variables whose name or value is not UTF-8 are skipped.
    ///
    /// # Errors
    ///
    /// See [`KeyStore::from_env_pairs`].
    pub fn from_env(namespace: &str) -> Result<Self, GhostError> {
        Self::from_env_pairs(namespace, crate::config::process_env())
    }

    /// Build a multi-key store for `namespace` by scanning `vars`.
    ///
    /// Each variable named [`env_key_prefix`] plus a suffix without `_` must
    /// hold a JSON [`TimestampedKey`]. Other variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidKey`] if a matching variable does not
    /// parse or no matching variable is found, and propagates derivation
    /// errors from [`KeyStore::new`].
    pub fn from_env_pairs<I, K, V>(namespace: &str, vars: I) -> Result<Self, GhostError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = env_key_prefix(namespace);
        let mut keys = Vec::new();

        for (name, value) in vars {
            let name = name.as_ref();
            if !is_key_variable(name, &prefix) {
                continue;
            }
            // Report position only: serde messages can echo the value.
            let tk: TimestampedKey = serde_json::from_str(value.as_ref()).map_err(|e| {
                GhostError::InvalidKey(format!(
                    "{name} is not a {{\"key\", \"timestamp\"}} object (line {}, column {})",
                    e.line(),
                    e.column()
                ))
            })?;
            keys.push(tk);
        }

        let store = KeyStore::new(namespace, keys)?;
        debug!(namespace, keys = store.len(), "key store loaded from environment");
        Ok(store)
    }
}
