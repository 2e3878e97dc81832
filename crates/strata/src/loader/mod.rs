//! Layered configuration loading pipeline.
//!
//! Sequences schema walking, default registration, source merging, hook
//! decoding, and validation into one synchronous load: any step failing
//! aborts the remaining steps and no partial object is produced.

mod decode;
mod registry;
mod utils;
mod validate;
mod walk;

#[cfg(test)]
mod tests;

pub use decode::{DecodeHook, default_hooks};
pub use registry::{EnvSource, FileSource, SourceRegistry, env_key};

use crate::{ConfigError, ConfigSchema};
use log::{debug, info};
use std::path::PathBuf;

/// Builder for one configuration load.
///
/// A load is one-shot: the source registry is built, populated, overlaid,
/// and dropped inside a single [`Loader::load`] call, so loads never
/// share state and the loader is re-entrant by construction.
#[derive(Debug)]
pub struct Loader {
    app_name: String,
    config_path: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    env: EnvSource,
    hooks: Vec<DecodeHook>,
}

impl Loader {
    /// Create a loader for the named application.
    ///
    /// The application name drives config-file discovery: without an
    /// explicit path, `~/.{app_name}` is searched for and is optional.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            config_path: None,
            home_dir: None,
            env: EnvSource::process(),
            hooks: default_hooks().to_vec(),
        }
    }

    /// Use an explicit config file instead of home-directory discovery.
    ///
    /// Unlike a discovered file, an explicit file must exist and parse.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Override the home directory searched during discovery.
    pub fn home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    /// Replace the environment layer snapshot.
    pub fn env_source(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Replace the decode hook table.
    pub fn hooks(mut self, hooks: Vec<DecodeHook>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Run the load pipeline and return the validated object.
    pub fn load<T: ConfigSchema>(self) -> Result<T, ConfigError> {
        let file = match self.config_path {
            Some(path) => FileSource::Path(path),
            None => FileSource::Discover {
                app_name: self.app_name,
                home_dir: self.home_dir,
            },
        };
        run(file, self.env, &self.hooks)
    }
}

/// Decode and validate a config from raw JSON5 contents.
///
/// Schema defaults still apply for keys the contents omit; no file
/// discovery or environment overlay happens.
pub fn load_from_str<T: ConfigSchema>(contents: &str) -> Result<T, ConfigError> {
    debug!("loading config from raw contents (len={})", contents.len());
    run(
        FileSource::Inline(contents.to_string()),
        EnvSource::empty(),
        default_hooks(),
    )
}

/// The load pipeline: walk schema, register defaults, merge sources,
/// decode with hooks, validate.
fn run<T: ConfigSchema>(
    file: FileSource,
    env: EnvSource,
    hooks: &[DecodeHook],
) -> Result<T, ConfigError> {
    let leaves = walk::walk_schema::<T>()?;
    debug!("schema walk found {} leaves", leaves.len());

    let mut registry = SourceRegistry::new();
    for leaf in &leaves {
        registry.set_default(leaf.key.clone(), leaf.default.clone());
    }
    registry.add_file_source(file);
    registry.enable_env_override(env);

    let merged = registry.resolve()?;
    if let Some(path) = registry.file_used() {
        info!("using config file: {}", path.display());
    }

    let config = decode::decode::<T>(&merged, &leaves, hooks)?;
    validate::validate(&config, &leaves)?;
    debug!("config loaded ({} keys)", merged.len());
    Ok(config)
}
