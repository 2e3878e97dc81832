//! Source registry: defaults, file, and environment layers.

use super::utils::{join_key, lookup_path};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Translate a dotted key path into its environment variable name.
///
/// Path separators become underscores and ASCII letters are upper-cased:
/// `http.port` becomes `HTTP_PORT`. The translation is deterministic,
/// reversible for well-formed keys, and stable across versions; operators
/// set variables against it.
pub fn env_key(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

/// Where the file layer comes from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// An explicit path; the file must exist and parse.
    Path(PathBuf),
    /// Search the home directory for `.{app_name}`; absence is fine.
    Discover {
        app_name: String,
        /// Home directory override; `None` resolves the user's home.
        home_dir: Option<PathBuf>,
    },
    /// Raw JSON5 contents, bypassing the filesystem.
    Inline(String),
}

/// Environment layer snapshot.
///
/// Variables are captured once, so a load is deterministic and tests can
/// inject bindings without mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: BTreeMap<String, String>,
}

impl EnvSource {
    /// Snapshot the current process environment.
    pub fn process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// An empty environment (no overrides).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a variable binding.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Look up a variable by its exact name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Ordered key/value layers for one load.
///
/// Schema defaults sit at the bottom; a file layer and an environment
/// layer are overlaid in that order when attached, later layers shadowing
/// earlier ones per key. A registry lives for a single load call.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    defaults: BTreeMap<String, Value>,
    file: Option<FileSource>,
    env: Option<EnvSource>,
    file_used: Option<PathBuf>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema default as the lowest-precedence layer.
    ///
    /// Registration also makes the key visible to the environment layer:
    /// only registered keys are looked up there.
    pub fn set_default(&mut self, key: impl Into<String>, value: Value) {
        self.defaults.insert(key.into(), value);
    }

    /// Attach the file layer.
    pub fn add_file_source(&mut self, source: FileSource) {
        self.file = Some(source);
    }

    /// Attach the environment layer.
    pub fn enable_env_override(&mut self, env: EnvSource) {
        self.env = Some(env);
    }

    /// Path of the file the last [`SourceRegistry::resolve`] read, if any.
    pub fn file_used(&self) -> Option<&Path> {
        self.file_used.as_deref()
    }

    /// Merge all layers into a flat dotted-key mapping.
    ///
    /// Precedence, low to high: defaults, file values, environment
    /// values. File keys outside the registered key space are ignored;
    /// environment values arrive as text and are typed later by the
    /// decode pipeline.
    pub fn resolve(&mut self) -> Result<BTreeMap<String, Value>, ConfigError> {
        let mut merged = self.defaults.clone();

        if let Some(source) = &self.file {
            if let Some((contents, path)) = read_file_layer(source)? {
                let tree: Value = json5::from_str(&contents)?;
                warn_unknown_keys("", &tree, &merged);
                for (key, slot) in merged.iter_mut() {
                    if let Some(found) = lookup_path(&tree, key) {
                        *slot = found.clone();
                    }
                }
                self.file_used = path;
            }
        }

        if let Some(env) = &self.env {
            for (key, slot) in merged.iter_mut() {
                if let Some(value) = env.get(&env_key(key)) {
                    *slot = Value::String(value.to_string());
                }
            }
        }

        Ok(merged)
    }
}

/// Read the file layer's contents, resolving discovery rules.
///
/// Returns `None` when a discovered file does not exist; an explicit
/// file must.
fn read_file_layer(source: &FileSource) -> Result<Option<(String, Option<PathBuf>)>, ConfigError> {
    match source {
        FileSource::Path(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(Some((contents, Some(path.clone()))))
        }
        FileSource::Discover { app_name, home_dir } => {
            let home = home_dir
                .clone()
                .or_else(|| UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf()));
            let Some(home) = home else {
                debug!("no home directory; skipping config file discovery");
                return Ok(None);
            };
            let path = home.join(format!(".{app_name}"));
            if !path.exists() {
                debug!("no config file at {}", path.display());
                return Ok(None);
            }
            let contents = fs::read_to_string(&path)?;
            Ok(Some((contents, Some(path))))
        }
        FileSource::Inline(contents) => Ok(Some((contents.clone(), None))),
    }
}

/// Log file keys that no registered key claims.
fn warn_unknown_keys(prefix: &str, value: &Value, registered: &BTreeMap<String, Value>) {
    let Value::Object(map) = value else {
        if !prefix.is_empty() && !registered.contains_key(prefix) {
            debug!("ignoring unknown config file key: {prefix}");
        }
        return;
    };
    for (key, nested) in map {
        let path = join_key(prefix, key);
        if registered.contains_key(&path) {
            continue;
        }
        warn_unknown_keys(&path, nested, registered);
    }
}
