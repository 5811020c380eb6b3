// SPDX-License-Identifier: MIT

//! Typed error handling for where-polyfill
//!
//! Scanning and applying never fail: malformed conditions compile to a
//! predicate that never matches and failed queries are logged. Errors only
//! surface from configuration, document loading and scheduler teardown.

use thiserror::Error;

/// Top-level error type for where-polyfill
#[derive(Debug, Error)]
pub enum WhereError {
    /// Configuration errors (invalid interval, empty prefix, bad env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised by the host document
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Scheduler task failed to shut down cleanly
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors reported by a host document implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The selector could not be parsed by the host's selector engine
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// No element with the given id exists
    #[error("Element '{0}' not found")]
    ElementNotFound(String),

    /// A document fixture uses a tag or attribute name that is not valid markup
    #[error("Invalid document fixture: {0}")]
    InvalidFixture(String),
}

impl WhereError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl HostError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}
