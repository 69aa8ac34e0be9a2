//! Token wire format, namespace rules, and errors shared across `ghoststring` crates.
//!
//! Nothing in this crate touches key material.

pub mod error;
pub mod namespace;
pub mod protocol;

pub use error::GhostError;
pub use namespace::{is_valid_namespace, validate_namespace};
pub use protocol::{Envelope, NAMESPACE_SEPARATOR, NONCE_LEN, PREFIX, TAG_LEN};
