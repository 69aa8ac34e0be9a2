//! AES-256-GCM sealing and opening of individual string payloads.
//!
//! **Nonces are random per call.** GCM nonce reuse under one key is
//! catastrophic: it breaks both confidentiality and authentication. Every
//! [`seal`] caller must pass a fresh [`generate_nonce`] value.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use common::{GhostError, NONCE_LEN};

use super::kdf::DerivedKey;

/// Generate a random 96-bit nonce from the OS CSPRNG.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext`, returning ciphertext with the 16-byte tag appended.
///
/// No associated data is bound; the namespace is carried by the token layer.
///
/// # Errors
///
/// Returns [`GhostError::EncryptionFailed`] on an internal AEAD error (should
/// be unreachable with a valid key and nonce).
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, GhostError> {
    build_cipher(key)?
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| GhostError::EncryptionFailed)
}

/// Decrypt and authenticate `sealed` (ciphertext‖tag).
///
/// # Errors
///
/// Returns [`GhostError::DecryptionFailed`] if authentication fails (wrong key
/// or tampered data).
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    sealed: &[u8],
) -> Result<Vec<u8>, GhostError> {
    build_cipher(key)?
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| GhostError::DecryptionFailed)
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256Gcm, GhostError> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| GhostError::InvalidKey("AES-256 requires a 32-byte key".into()))
}
