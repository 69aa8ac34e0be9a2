//! Key derivation and AES-256-GCM primitives.
//!
//! This module knows nothing about namespaces beyond salting, nor about the
//! token layout. It provides the low-level operations used by the key store
//! and the ghostifyers.

pub mod cipher;
pub mod kdf;

pub use kdf::{derive_key, DerivedKey, KEY_LEN};
