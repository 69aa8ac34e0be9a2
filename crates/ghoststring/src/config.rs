//! Configuration loading and validation.
//!
//! Values are read from `GHOSTSTRING_*` environment variables at startup.
//! Key material is *not* part of [`Config`]; it is read per namespace from
//! `GHOSTSTRING_KEY_<NS>_*` by [`crate::keystore::KeyStore::from_env`].

use std::collections::HashMap;

use anyhow::{Context, Result};
use common::validate_namespace;
use serde::Deserialize;

use crate::keystore::env_key_prefix;

/// Prefix of every configuration variable.
pub const ENV_PREFIX: &str = "GHOSTSTRING";

/// Validated ghoststring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Namespaces to build policies for, from the comma-separated
    /// `GHOSTSTRING_NAMESPACES`. **Required.**
    pub namespaces: Vec<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

/// Snapshot of the process environment, skipping any variable whose name or
/// value is not valid UTF-8.
pub(crate) fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(Some(process_env().into_iter().collect()))
    }

    /// As [`Config::from_env`], reading from `vars` instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Some(vars))
    }

    fn load(source: Option<HashMap<String, String>>) -> Result<Self> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("namespaces")
            .source(source);

        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.namespaces.is_empty() {
            anyhow::bail!("GHOSTSTRING_NAMESPACES must list at least one namespace");
        }
        let mut prefixes: HashMap<String, &str> = HashMap::new();
        for namespace in &self.namespaces {
            validate_namespace(namespace)
                .with_context(|| format!("GHOSTSTRING_NAMESPACES entry {namespace:?}"))?;
            let prefix = env_key_prefix(namespace);
            if let Some(other) = prefixes.insert(prefix.clone(), namespace) {
                if other != namespace.as_str() {
                    anyhow::bail!(
                        "namespaces {other:?} and {namespace:?} would both read keys from {prefix}*"
                    );
                }
            }
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("GHOSTSTRING_LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}
