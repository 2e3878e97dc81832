//! Error types for config loading and validation.

use std::fmt;
use thiserror::Error;

/// Errors returned while loading or validating config.
///
/// All variants are fatal to the load that produced them: the caller
/// receives either a complete object or one of these, never both.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The schema shape is unusable for configuration binding.
    #[error("invalid config schema: {0}")]
    Schema(String),
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// A raw value could not be converted to its destination kind.
    #[error("failed to decode {key}: {message} (value: {value:?})")]
    Decode {
        key: String,
        value: String,
        message: String,
    },
    /// Rebuilding the typed object from converted values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// One or more fields violated their declared rules.
    #[error("config validation failed: {0}")]
    Validation(Violations),
}

/// A single violated validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted configuration key, as written in files and env bindings.
    pub key: String,
    /// Name of the violated rule.
    pub rule: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violates \"{}\": {}", self.key, self.rule, self.message)
    }
}

/// Every violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
            first = false;
        }
        Ok(())
    }
}
