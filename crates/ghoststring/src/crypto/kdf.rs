//! Namespace-scoped Argon2id key derivation.
//!
//! The salt is `SHA-1(SALT_PREFIX ‖ namespace)`, so one passphrase yields a
//! different key in every namespace without callers managing salts.

use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use common::{validate_namespace, GhostError};
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Application constant mixed into every namespace salt.
pub const SALT_PREFIX: &str = "github.com/rstudio/ghoststring:";

/// Argon2id time cost (passes).
pub const ARGON2_TIME_COST: u32 = 1;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id lanes.
pub const ARGON2_PARALLELISM: u32 = 4;

/// A 32-byte symmetric key produced by [`derive_key`] or supplied externally.
///
/// The bytes are zeroed on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Wrap externally supplied key bytes, e.g. a data key unwrapped by a KMS.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidKey`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, GhostError> {
        if bytes.len() != KEY_LEN {
            return Err(GhostError::InvalidKey(format!(
                "expected {KEY_LEN} key bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = Zeroizing::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Compute the Argon2 salt for `namespace`.
pub fn namespace_salt(namespace: &str) -> [u8; 20] {
    let digest = Sha1::new()
        .chain_update(SALT_PREFIX.as_bytes())
        .chain_update(namespace.as_bytes())
        .finalize();
    let mut salt = [0u8; 20];
    salt.copy_from_slice(&digest);
    salt
}

/// Derive the AES-256 key for `passphrase` within `namespace`.
///
/// Deterministic: identical inputs always give the same key.
///
/// # Errors
///
/// Returns [`GhostError::InvalidNamespace`] for a bad namespace,
/// [`GhostError::InvalidKey`] for a blank passphrase, and
/// [`GhostError::KeyDerivation`] if Argon2 itself fails (allocation).
pub fn derive_key(namespace: &str, passphrase: &str) -> Result<DerivedKey, GhostError> {
    validate_namespace(namespace)?;
    if passphrase.trim().is_empty() {
        return Err(GhostError::InvalidKey("passphrase must not be blank".into()));
    }

    let params = ParamsBuilder::new()
        .m_cost(ARGON2_MEMORY_KIB)
        .t_cost(ARGON2_TIME_COST)
        .p_cost(ARGON2_PARALLELISM)
        .output_len(KEY_LEN)
        .build()
        .map_err(|e| GhostError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), &namespace_salt(namespace), &mut *key)
        .map_err(|e| GhostError::KeyDerivation(e.to_string()))?;

    Ok(DerivedKey(key))
}
