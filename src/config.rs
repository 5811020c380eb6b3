// SPDX-License-Identifier: MIT

//! Engine configuration - YAML file and environment loading

use crate::error::WhereError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 400;
pub const DEFAULT_CLASS_PREFIX: &str = "where-";

const ENV_POLL_INTERVAL: &str = "WHERE_POLL_INTERVAL_MS";
const ENV_CLASS_PREFIX: &str = "WHERE_CLASS_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period between apply cycles
    pub poll_interval_ms: u64,
    /// Prefix of the synthetic condition classes, without the leading dot
    pub class_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WhereError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a configuration from a YAML string. Missing keys take defaults.
    pub fn parse_yaml(content: &str) -> Result<Self, WhereError> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WHERE_POLL_INTERVAL_MS` and `WHERE_CLASS_PREFIX` on top of `self`
    pub fn with_env(self) -> Result<Self, WhereError> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars<F>(mut self, lookup: F) -> Result<Self, WhereError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            self.poll_interval_ms = raw.trim().parse().map_err(|_| {
                WhereError::config(format!("{} is not an integer: {}", ENV_POLL_INTERVAL, raw))
            })?;
        }
        if let Some(prefix) = lookup(ENV_CLASS_PREFIX) {
            self.class_prefix = prefix;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), WhereError> {
        if self.poll_interval_ms == 0 {
            return Err(WhereError::config("poll_interval_ms must be positive"));
        }
        if self.class_prefix.is_empty() {
            return Err(WhereError::config("class_prefix must not be empty"));
        }
        if self.class_prefix.chars().any(char::is_whitespace) {
            return Err(WhereError::config(format!(
                "class_prefix must not contain whitespace: '{}'",
                self.class_prefix
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
