//! Layered configuration loading.
//!
//! This crate owns the schema walking, source merging, decode, and
//! validation pipeline that turns schema defaults, an optional config
//! file, and environment variables into one validated, typed object.

mod error;
mod level;
mod loader;
mod schema;

/// Public error type returned by config loading and validation APIs.
pub use error::{ConfigError, Violation, Violations};
/// Log severity carried in configuration values.
pub use level::{LogLevel, ParseLevelError};
/// Loader entry points, decode hooks, and source layers.
pub use loader::{
    DecodeHook, EnvSource, FileSource, Loader, SourceRegistry, default_hooks, env_key,
    load_from_str,
};
/// Schema contract and per-field metadata.
pub use schema::{ConfigSchema, FieldMeta, LeafKind, Rule};
