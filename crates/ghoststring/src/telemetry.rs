//! Tracing subscriber setup for processes embedding ghoststring.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, passphrase or key material** appears in any span or
//!   event emitted by this crate; only namespaces and counts do.
//! - The configured level applies to the `ghoststring` target only; other
//!   crates log at `warn`.
//! - `RUST_LOG` overrides both.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target prefix of every event this crate emits.
pub const LOG_TARGET: &str = "ghoststring";

/// Filter directives for `log_level`: the level applies to ghoststring's own
/// events, everything else in the process stays at `warn`.
pub fn directives(log_level: &str) -> String {
    format!("warn,{LOG_TARGET}={log_level}")
}

/// Initialise a JSON tracing subscriber with ghoststring events at `log_level`.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid level or a global
/// subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives(log_level))
            .with_context(|| format!("invalid log level {log_level:?}"))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .context("failed to initialise ghoststring tracing subscriber")
}
