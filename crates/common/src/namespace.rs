//! Namespace validation.
//!
//! A namespace starts with an ASCII letter, continues with letters, digits,
//! `-`, `_` or `.`, ends with a letter or digit, and is 3 to
//! [`MAX_NAMESPACE_LEN`] characters long. `:` is never allowed, so a valid
//! namespace cannot contain the token separator.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::GhostError;

/// Pattern every namespace must match in full.
pub const NAMESPACE_MATCH_REGEXP: &str = r"^[a-zA-Z][-._a-zA-Z0-9]{1,254}[a-zA-Z0-9]$";

/// Maximum namespace length in bytes.
pub const MAX_NAMESPACE_LEN: usize = 256;

static NAMESPACE_MATCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NAMESPACE_MATCH_REGEXP).expect("namespace pattern is a valid regex"));

/// Check `namespace` against the namespace rules.
///
/// # Errors
///
/// Returns [`GhostError::InvalidNamespace`] naming the first rule violated.
pub fn validate_namespace(namespace: &str) -> Result<(), GhostError> {
    if namespace != namespace.trim() {
        return Err(GhostError::invalid_namespace(
            namespace,
            "leading or trailing whitespace",
        ));
    }
    if namespace.len() > MAX_NAMESPACE_LEN {
        return Err(GhostError::invalid_namespace(
            namespace,
            "longer than 256 characters",
        ));
    }
    if !NAMESPACE_MATCH.is_match(namespace) {
        return Err(GhostError::invalid_namespace(
            namespace,
            "must start with a letter, end with a letter or digit, and contain only letters, digits, '-', '_' or '.'",
        ));
    }
    Ok(())
}

/// Returns `true` if `namespace` passes [`validate_namespace`].
pub fn is_valid_namespace(namespace: &str) -> bool {
    validate_namespace(namespace).is_ok()
}
