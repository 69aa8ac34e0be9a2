//! [`TimestampedKey`]: one passphrase and the moment it became active.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A passphrase tagged with the epoch-millisecond timestamp it was issued at.
///
/// This is the configuration-side shape, `{"key": "...", "timestamp": 1661351759000}`.
/// The passphrase is wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedKey {
    /// Epoch milliseconds; larger is newer.
    pub timestamp: i64,
    /// The passphrase fed to key derivation.
    pub key: String,
}

impl TimestampedKey {
    /// Construct a [`TimestampedKey`].
    pub fn new(timestamp: i64, key: impl Into<String>) -> Self {
        Self {
            timestamp,
            key: key.into(),
        }
    }
}

impl Drop for TimestampedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for TimestampedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampedKey")
            .field("timestamp", &self.timestamp)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_shape() {
        let tk: TimestampedKey =
            serde_json::from_str(r#"{"key":"correct horse battery paperclip","timestamp":42}"#)
                .unwrap();
        assert_eq!(tk, TimestampedKey::new(42, "correct horse battery paperclip"));
    }

    #[test]
    fn negative_timestamps_allowed() {
        let tk: TimestampedKey =
            serde_json::from_str(r#"{"key":"green smoothie watch fan","timestamp":-1}"#).unwrap();
        assert_eq!(tk.timestamp, -1);
    }

    #[test]
    fn missing_timestamp_rejected() {
        assert!(serde_json::from_str::<TimestampedKey>(r#"{"key":"k"}"#).is_err());
    }

    #[test]
    fn passphrase_redacted_in_debug() {
        let tk = TimestampedKey::new(11, "suspicious tote ukelele bongo");
        let printed = format!("{tk:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("ukelele"));
    }
}
