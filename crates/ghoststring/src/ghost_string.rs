//! [`GhostString`]: a string field that serializes as an encrypted token.

use std::fmt;

use common::{is_valid_namespace, GhostError};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::registry::Registry;

/// A confidential string value and the namespace whose keys protect it.
///
/// With `serde`, a `GhostString` field is written as a ghostified token and
/// read back transparently, using the process-wide [`Registry::global`]:
///
/// ```no_run
/// use ghoststring::{set_ghostifyer, GhostString, Ghostifyer};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Tree {
///     phylogeny: u32,
///     secret_identity: GhostString,
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// set_ghostifyer(Ghostifyer::single_key("test.local", "correct horse battery staple")?)?;
///
/// let tree = Tree {
///     phylogeny: 42,
///     secret_identity: GhostString::new("test.local", "daisy"),
/// };
/// let json = serde_json::to_string(&tree)?;
/// let back: Tree = serde_json::from_str(&json)?;
/// assert_eq!(back.secret_identity.value(), "daisy");
/// # Ok(())
/// # }
/// ```
///
/// An empty or invalid value serializes to `""`, and `""` deserializes to
/// [`GhostString::empty`]. The plaintext is wiped on drop and never printed
/// by `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GhostString {
    namespace: String,
    value: String,
}

impl GhostString {
    /// Wrap `value` under `namespace`.
    pub fn new(namespace: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            value: value.into(),
        }
    }

    /// The absent value: empty namespace, empty plaintext.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Namespace routing this value to its keys.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The plaintext.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `true` iff the plaintext is non-empty and the namespace is valid.
    ///
    /// Invalid values are never encrypted; they encode to `""`.
    pub fn is_valid(&self) -> bool {
        !self.value.is_empty() && is_valid_namespace(&self.namespace)
    }

    /// `true` if there is no plaintext.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Encode through the process-wide registry.
    ///
    /// # Errors
    ///
    /// See [`Registry::serialize`].
    pub fn to_token(&self) -> Result<String, GhostError> {
        Registry::global().serialize(self)
    }

    /// Encode through an explicit registry.
    ///
    /// # Errors
    ///
    /// See [`Registry::serialize`].
    pub fn to_token_with(&self, registry: &Registry) -> Result<String, GhostError> {
        registry.serialize(self)
    }

    /// Decode through the process-wide registry.
    ///
    /// # Errors
    ///
    /// See [`Registry::parse`].
    pub fn from_token(token: &str) -> Result<Self, GhostError> {
        Registry::global().parse(token)
    }
}

impl Drop for GhostString {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl fmt::Debug for GhostString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostString")
            .field("namespace", &self.namespace)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Renders the token, or nothing if encoding fails.
impl fmt::Display for GhostString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token().unwrap_or_default())
    }
}

impl Serialize for GhostString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let token = self
            .to_token()
            .map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&token)
    }
}

impl<'de> Deserialize<'de> for GhostString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        GhostString::from_token(&token).map_err(de::Error::custom)
    }
}
