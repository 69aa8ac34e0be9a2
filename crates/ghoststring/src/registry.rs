//! Namespace → [`Ghostifyer`] routing.
//!
//! Registration takes the write lock, resolution the read lock. Entries are
//! never removed; the last registration for a namespace wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use common::{protocol, validate_namespace, Envelope, GhostError};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::ghost_string::GhostString;
use crate::ghostifyer::Ghostifyer;
use crate::keystore::KeyStore;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Thread-safe map from namespace to its active policy.
///
/// Prefer passing a `Registry` explicitly. The serde impls on [`GhostString`]
/// have nowhere to thread one through, so they use [`Registry::global`].
#[derive(Debug, Default)]
pub struct Registry {
    ghostifyers: RwLock<HashMap<String, Ghostifyer>>,
}

impl Registry {
    /// Create a new, empty [`Registry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry. Lives for the whole process.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Build a registry holding one multi-key policy per configured
    /// namespace, with keys read from the process environment. Variables
    /// that are not UTF-8 are skipped.
    ///
    /// # Errors
    ///
    /// Fails if any namespace has no keys or a key fails to parse or derive.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::from_config_and_env(cfg, &crate::config::process_env())
    }

    /// As [`Registry::from_config`], scanning `env` instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Fails if any namespace has no keys or a key fails to parse or derive.
    pub fn from_config_and_env(cfg: &Config, env: &[(String, String)]) -> Result<Self> {
        let registry = Self::new();
        for namespace in &cfg.namespaces {
            let store = KeyStore::from_env_pairs(
                namespace,
                env.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .with_context(|| format!("failed to load keys for namespace {namespace:?}"))?;
            let ghostifyer = Ghostifyer::multi_key(namespace, store)
                .with_context(|| format!("failed to build ghostifyer for {namespace:?}"))?;
            registry.register(ghostifyer)?;
        }
        info!(namespaces = registry.len(), "ghoststring registry loaded");
        Ok(registry)
    }

    /// Register `ghostifyer` under its own namespace, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidNamespace`] if the ghostifyer's namespace
    /// is invalid (always the case for [`Ghostifyer::Null`]).
    pub fn register(&self, ghostifyer: Ghostifyer) -> Result<(), GhostError> {
        validate_namespace(ghostifyer.namespace())?;
        let namespace = ghostifyer.namespace().to_owned();
        debug!(namespace = %namespace, "registering ghostifyer");
        self.ghostifyers.write().insert(namespace, ghostifyer);
        Ok(())
    }

    /// Policy for encoding under `namespace`; [`Ghostifyer::Null`] on a miss.
    pub fn resolve_for_encode(&self, namespace: &str) -> Ghostifyer {
        match self.ghostifyers.read().get(namespace) {
            Some(g) => g.clone(),
            None => {
                debug!(namespace, "no ghostifyer registered; encoding as empty");
                Ghostifyer::Null
            }
        }
    }

    /// Policy for decoding under `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::NoPolicyRegistered`] on a miss.
    pub fn resolve_for_decode(&self, namespace: &str) -> Result<Ghostifyer, GhostError> {
        self.ghostifyers
            .read()
            .get(namespace)
            .cloned()
            .ok_or_else(|| GhostError::NoPolicyRegistered(namespace.to_owned()))
    }

    /// Returns `true` if `namespace` has a registered policy.
    pub fn contains(&self, namespace: &str) -> bool {
        self.ghostifyers.read().contains_key(namespace)
    }

    /// Number of registered namespaces.
    pub fn len(&self) -> usize {
        self.ghostifyers.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.ghostifyers.read().is_empty()
    }

    /// Encode `value` with the policy for its own namespace.
    ///
    /// Invalid values and unregistered namespaces encode to `""`.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::EncryptionFailed`] if sealing fails.
    pub fn serialize(&self, value: &GhostString) -> Result<String, GhostError> {
        if !value.is_valid() {
            return Ok(String::new());
        }
        self.resolve_for_encode(value.namespace()).ghostify(value)
    }

    /// Decode `token` with the policy for the namespace embedded in it.
    ///
    /// The embedded namespace is trusted; use [`Registry::parse_expecting`]
    /// to pin it.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::MalformedToken`],
    /// [`GhostError::NoPolicyRegistered`] or [`GhostError::DecryptionFailed`].
    pub fn parse(&self, token: &str) -> Result<GhostString, GhostError> {
        if protocol::is_empty_token(token) {
            return Ok(GhostString::empty());
        }
        let envelope = Envelope::decode(token)?;
        self.resolve_for_decode(&envelope.namespace)?
            .unghostify(token)
    }

    /// Decode `token` only if it was ghostified under `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::NamespaceMismatch`] before trying any key if the
    /// embedded namespace differs, otherwise as [`Registry::parse`].
    pub fn parse_expecting(&self, expected: &str, token: &str) -> Result<GhostString, GhostError> {
        if protocol::is_empty_token(token) {
            return Ok(GhostString::empty());
        }
        let envelope = Envelope::decode(token)?;
        if envelope.namespace != expected {
            return Err(GhostError::NamespaceMismatch {
                expected: expected.to_owned(),
                found: envelope.namespace,
            });
        }
        self.resolve_for_decode(expected)?.unghostify(token)
    }
}

/// Register `ghostifyer` in the process-wide registry.
///
/// # Errors
///
/// See [`Registry::register`].
pub fn set_ghostifyer(ghostifyer: Ghostifyer) -> Result<(), GhostError> {
    Registry::global().register(ghostifyer)
}

/// Decoding policy for `namespace` in the process-wide registry.
///
/// # Errors
///
/// Returns [`GhostError::NoPolicyRegistered`] if none is registered.
pub fn ghostifyer_for(namespace: &str) -> Result<Ghostifyer, GhostError> {
    Registry::global().resolve_for_decode(namespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DerivedKey, KEY_LEN};

    fn ghostifyer(namespace: &str, byte: u8) -> Ghostifyer {
        let key = DerivedKey::from_slice(&[byte; KEY_LEN]).unwrap();
        Ghostifyer::multi_key(namespace, KeyStore::from_derived(vec![(1, key)]).unwrap()).unwrap()
    }

    #[test]
    fn register_and_resolve() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        registry.register(ghostifyer("alpha", 1)).unwrap();
        assert!(registry.contains("alpha"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve_for_decode("alpha").unwrap().namespace(), "alpha");
    }

    #[test]
    fn null_ghostifyer_cannot_be_registered() {
        let registry = Registry::new();
        assert!(matches!(
            registry.register(Ghostifyer::null()),
            Err(GhostError::InvalidNamespace { .. })
        ));
    }

    #[test]
    fn encode_miss_falls_back_to_null() {
        let registry = Registry::new();
        assert!(matches!(
            registry.resolve_for_encode("missing"),
            Ghostifyer::Null
        ));
        assert_eq!(
            registry.serialize(&GhostString::new("missing", "x")).unwrap(),
            ""
        );
    }

    #[test]
    fn decode_miss_is_an_error() {
        let source = Registry::new();
        source.register(ghostifyer("alpha", 1)).unwrap();
        let token = source.serialize(&GhostString::new("alpha", "x")).unwrap();

        let registry = Registry::new();
        assert_eq!(
            registry.parse(&token),
            Err(GhostError::NoPolicyRegistered("alpha".into()))
        );
    }

    #[test]
    fn last_registration_wins() {
        let registry = Registry::new();
        registry.register(ghostifyer("alpha", 1)).unwrap();
        let old_token = registry.serialize(&GhostString::new("alpha", "x")).unwrap();

        registry.register(ghostifyer("alpha", 2)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.parse(&old_token), Err(GhostError::DecryptionFailed));
    }

    #[test]
    fn serialize_parse_round_trip() {
        let registry = Registry::new();
        registry.register(ghostifyer("alpha", 1)).unwrap();
        let value = GhostString::new("alpha", "pointy");
        let token = value.to_token_with(&registry).unwrap();
        assert_eq!(registry.parse(&token).unwrap(), value);
    }

    #[test]
    fn empty_round_trip() {
        let registry = Registry::new();
        assert_eq!(registry.serialize(&GhostString::empty()).unwrap(), "");
        assert_eq!(registry.parse("").unwrap(), GhostString::empty());
        assert_eq!(
            registry.parse_expecting("alpha", "").unwrap(),
            GhostString::empty()
        );
    }

    #[test]
    fn parse_routes_by_embedded_namespace() {
        let registry = Registry::new();
        registry.register(ghostifyer("alpha", 1)).unwrap();
        registry.register(ghostifyer("beta", 2)).unwrap();
        let token = registry.serialize(&GhostString::new("beta", "b")).unwrap();
        assert_eq!(registry.parse(&token).unwrap().namespace(), "beta");
    }

    #[test]
    fn parse_expecting_rejects_moved_tokens() {
        let registry = Registry::new();
        registry.register(ghostifyer("alpha", 1)).unwrap();
        registry.register(ghostifyer("beta", 2)).unwrap();
        let token = registry.serialize(&GhostString::new("beta", "b")).unwrap();

        assert_eq!(
            registry.parse_expecting("alpha", &token),
            Err(GhostError::NamespaceMismatch {
                expected: "alpha".into(),
                found: "beta".into(),
            })
        );
        assert_eq!(registry.parse_expecting("beta", &token).unwrap().value(), "b");
    }

    #[test]
    fn concurrent_register_and_resolve() {
        let registry = Registry::new();
        registry.register(ghostifyer("shared", 1)).unwrap();
        let token = registry.serialize(&GhostString::new("shared", "v")).unwrap();

        std::thread::scope(|s| {
            for i in 0..4u8 {
                let registry = &registry;
                s.spawn(move || {
                    registry.register(ghostifyer(&format!("writer{i}"), i)).unwrap();
                });
            }
            for _ in 0..8 {
                let registry = &registry;
                let token = token.as_str();
                s.spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(registry.parse(token).unwrap().value(), "v");
                    }
                });
            }
        });

        assert_eq!(registry.len(), 5);
    }
}
