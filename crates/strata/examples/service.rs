//! Minimal consuming service: load config, wire up logging, report the
//! listen address.
//!
//! Pass a config file path as the first argument, or drop a `.strata-demo`
//! JSON5 file in your home directory, or export `HTTP_PORT` / `LOG_LEVEL`.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strata::{ConfigSchema, FieldMeta, LeafKind, Loader, LogLevel, Rule};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct HttpConfig {
    host: String,
    port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ServiceConfig {
    http: HttpConfig,
    log_level: LogLevel,
}

impl ConfigSchema for ServiceConfig {
    fn fields() -> &'static [FieldMeta] {
        &[
            FieldMeta {
                key: "log_level",
                kind: Some(LeafKind::Severity),
                rules: &[],
            },
            FieldMeta {
                key: "http.port",
                kind: None,
                rules: &[Rule::Min(1), Rule::Max(65535)],
            },
        ]
    }
}

fn main() -> anyhow::Result<()> {
    let mut loader = Loader::new("strata-demo");
    if let Some(path) = std::env::args().nth(1) {
        loader = loader.config_path(path);
    }

    let config: ServiceConfig = loader.load().context("failed to load configuration")?;

    env_logger::Builder::new()
        .filter_level(config.log_level.into())
        .init();

    log::info!("listening on {}:{}", config.http.host, config.http.port);
    log::debug!("effective config: {config:?}");
    Ok(())
}
