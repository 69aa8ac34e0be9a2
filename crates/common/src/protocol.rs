//! Ghostified token wire format.
//!
//! ```text
//! 👻:<base64-std-padded>( <nonce:12 bytes> <namespace utf-8> "::" <ciphertext+16-byte tag> )
//! ```
//!
//! The namespace travels in the clear so a token can be routed to the policy
//! that produced it. The empty string, and a bare [`PREFIX`], mean "no value";
//! neither is ever produced for a real secret.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::GhostError;

/// Marker that starts every ghostified token.
pub const PREFIX: &str = "👻:";

/// Separates the namespace from the ciphertext inside the decoded payload.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// A decoded token: everything needed to route and open one ghostified value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Namespace the value was ghostified under.
    pub namespace: String,
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode this envelope to its token string.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::InvalidNamespace`] if the namespace contains
    /// [`NAMESPACE_SEPARATOR`]; such a token could not be split again.
    pub fn encode(&self) -> Result<String, GhostError> {
        if self.namespace.contains(NAMESPACE_SEPARATOR) {
            return Err(GhostError::invalid_namespace(
                &self.namespace,
                "contains the '::' separator",
            ));
        }

        let mut payload = Vec::with_capacity(
            NONCE_LEN + self.namespace.len() + NAMESPACE_SEPARATOR.len() + self.ciphertext.len(),
        );
        payload.extend_from_slice(&self.nonce);
        payload.extend_from_slice(self.namespace.as_bytes());
        payload.extend_from_slice(NAMESPACE_SEPARATOR.as_bytes());
        payload.extend_from_slice(&self.ciphertext);

        Ok(format!("{PREFIX}{}", STANDARD.encode(payload)))
    }

    /// Parse a token back into an [`Envelope`].
    ///
    /// The payload is split on the *first* separator after the nonce, so the
    /// ciphertext itself may contain `::` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GhostError::MalformedToken`] if the prefix is missing, the
    /// payload is not valid base64, it is shorter than a nonce, the separator
    /// is absent, or the namespace is not UTF-8.
    pub fn decode(token: &str) -> Result<Self, GhostError> {
        let encoded = token
            .strip_prefix(PREFIX)
            .ok_or(GhostError::MalformedToken("missing ghoststring prefix"))?;

        let raw = STANDARD
            .decode(encoded)
            .map_err(|_| GhostError::MalformedToken("payload is not valid base64"))?;

        if raw.len() < NONCE_LEN {
            return Err(GhostError::MalformedToken("payload shorter than nonce"));
        }
        let (nonce_bytes, rest) = raw.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        let split_at = find_separator(rest)
            .ok_or(GhostError::MalformedToken("missing namespace separator"))?;
        let namespace = std::str::from_utf8(&rest[..split_at])
            .map_err(|_| GhostError::MalformedToken("namespace is not valid UTF-8"))?
            .to_owned();
        let ciphertext = rest[split_at + NAMESPACE_SEPARATOR.len()..].to_vec();

        Ok(Self {
            nonce,
            namespace,
            ciphertext,
        })
    }
}

/// Returns `true` for the two spellings of "no value": `""` and a bare [`PREFIX`].
pub fn is_empty_token(token: &str) -> bool {
    token.is_empty() || token == PREFIX
}

/// Returns `true` if `s` carries the ghoststring prefix.
///
/// A cheap check for telling tokens apart from ordinary strings; it does not
/// validate the payload.
pub fn is_token(s: &str) -> bool {
    s.starts_with(PREFIX)
}

fn find_separator(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(NAMESPACE_SEPARATOR.len())
        .position(|w| w == NAMESPACE_SEPARATOR.as_bytes())
}
