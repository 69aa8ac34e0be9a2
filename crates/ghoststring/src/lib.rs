//! Field-level encryption for structured documents.
//!
//! A [`GhostString`] holds a confidential string and the namespace that picks
//! its keys. Serializing it produces a self-describing token:
//!
//! ```text
//! 👻:<base64>( nonce ‖ namespace ‖ "::" ‖ AES-256-GCM ciphertext+tag )
//! ```
//!
//! Keys are derived per namespace from passphrases with Argon2id, can rotate
//! (newest encrypts, all decrypt), and are resolved through a [`Registry`].
//!
//! # Startup
//!
//! ```no_run
//! use ghoststring::{telemetry, Config, Registry};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::from_env()?;
//! telemetry::init(&cfg.log_level)?;
//! let registry = Registry::from_config(&cfg)?;
//! # let _ = registry;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod ghost_string;
pub mod ghostifyer;
pub mod keystore;
pub mod registry;
pub mod telemetry;

pub use common::{protocol, Envelope, GhostError, NAMESPACE_SEPARATOR, PREFIX};
pub use common::{is_valid_namespace, validate_namespace};
pub use crate::config::Config;
pub use crypto::{derive_key, DerivedKey};
pub use ghost_string::GhostString;
pub use ghostifyer::{Aes256GcmGhostifyer, Ghostifyer};
pub use keystore::{KeyStore, TimestampedKey};
pub use registry::{ghostifyer_for, set_ghostifyer, Registry};
