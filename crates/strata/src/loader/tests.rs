//! Tests for the layered loading pipeline.

use super::*;
use crate::{ConfigError, ConfigSchema, FieldMeta, LeafKind, LogLevel, Rule};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct HttpSection {
    host: String,
    port: u16,
    request_logging: bool,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_logging: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ServiceConfig {
    http: HttpSection,
    log_level: LogLevel,
    log_format: String,
    #[serde(skip)]
    loaded_at_tick: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http: HttpSection::default(),
            log_level: LogLevel::Info,
            log_format: "pretty".to_string(),
            loaded_at_tick: 0,
        }
    }
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
                key: "log_format",
                kind: None,
                rules: &[Rule::OneOf(&["json", "pretty"])],
            },
            FieldMeta {
                key: "http.host",
                kind: None,
                rules: &[Rule::Required],
            },
            FieldMeta {
                key: "http.port",
                kind: None,
                rules: &[Rule::Min(1), Rule::Max(65535)],
            },
        ]
    }
}

/// Every leaf appears with its declared default; skipped fields never bind.
#[test]
fn walk_flattens_nested_defaults() {
    let leaves = walk::walk_schema::<ServiceConfig>().expect("walk");
    let keys: Vec<&str> = leaves.iter().map(|leaf| leaf.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "http.host",
            "http.port",
            "http.request_logging",
            "log_format",
            "log_level",
        ]
    );

    let port = leaves.iter().find(|leaf| leaf.key == "http.port").unwrap();
    assert_eq!(port.default, json!(8080));
    assert_eq!(port.kind, LeafKind::Integer);

    let level = leaves.iter().find(|leaf| leaf.key == "log_level").unwrap();
    assert_eq!(level.default, json!("INFO"));
    assert_eq!(level.kind, LeafKind::Severity);
}

#[test]
fn walk_rejects_unknown_metadata_key() {
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Tiny {
        name: String,
    }
    impl ConfigSchema for Tiny {
        fn fields() -> &'static [FieldMeta] {
            &[FieldMeta {
                key: "misspelled",
                kind: None,
                rules: &[],
            }]
        }
    }

    let err = walk::walk_schema::<Tiny>().unwrap_err();
    assert!(matches!(err, ConfigError::Schema(_)));
    assert!(err.to_string().contains("misspelled"));
}

#[test]
fn walk_rejects_contradicting_kind() {
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Flagged {
        enabled: bool,
    }
    impl ConfigSchema for Flagged {
        fn fields() -> &'static [FieldMeta] {
            &[FieldMeta {
                key: "enabled",
                kind: Some(LeafKind::Severity),
                rules: &[],
            }]
        }
    }

    let err = walk::walk_schema::<Flagged>().unwrap_err();
    assert!(err.to_string().contains("enabled"));
}

#[test]
fn walk_requires_kind_for_null_defaults() {
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Secret {
        token: Option<String>,
    }
    impl ConfigSchema for Secret {}

    let err = walk::walk_schema::<Secret>().unwrap_err();
    assert!(matches!(err, ConfigError::Schema(_)));
    assert!(err.to_string().contains("token"));
}

#[test]
fn walk_rejects_rules_on_wrong_kinds() {
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Flagged {
        enabled: bool,
    }
    impl ConfigSchema for Flagged {
        fn fields() -> &'static [FieldMeta] {
            &[FieldMeta {
                key: "enabled",
                kind: None,
                rules: &[Rule::Min(1)],
            }]
        }
    }

    let err = walk::walk_schema::<Flagged>().unwrap_err();
    assert!(err.to_string().contains("min"));
}

#[test]
fn env_key_translation_is_deterministic() {
    assert_eq!(env_key("http.port"), "HTTP_PORT");
    assert_eq!(env_key("log_level"), "LOG_LEVEL");
    assert_eq!(env_key("a.b.c"), "A_B_C");
}

/// Later layers shadow earlier ones: defaults < file < environment.
#[test]
fn registry_layers_shadow_in_order() {
    let mut registry = SourceRegistry::new();
    registry.set_default("http.host", json!("127.0.0.1"));
    registry.set_default("http.port", json!(8080));
    registry.add_file_source(FileSource::Inline(
        "{ http: { host: \"0.0.0.0\", port: 9090 } }".to_string(),
    ));
    registry.enable_env_override(EnvSource::empty().with_var("HTTP_PORT", "7070"));

    let merged = registry.resolve().expect("resolve");
    assert_eq!(merged["http.host"], json!("0.0.0.0"));
    assert_eq!(merged["http.port"], json!("7070"));
}

#[test]
fn registry_ignores_unknown_file_keys() {
    let mut registry = SourceRegistry::new();
    registry.set_default("http.port", json!(8080));
    registry.add_file_source(FileSource::Inline(
        "{ http: { port: 9090 }, surprise: true }".to_string(),
    ));

    let merged = registry.resolve().expect("resolve");
    assert_eq!(merged["http.port"], json!(9090));
    assert!(!merged.contains_key("surprise"));
}

#[test]
fn registry_propagates_parse_failures() {
    let mut registry = SourceRegistry::new();
    registry.set_default("http.port", json!(8080));
    registry.add_file_source(FileSource::Inline("{ not json5".to_string()));

    let err = registry.resolve().unwrap_err();
    assert!(matches!(err, ConfigError::ParseFailed(_)));
}

#[test]
fn defaults_alone_produce_a_config() {
    let config: ServiceConfig = load_from_str("{}").expect("config");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.http.host, "127.0.0.1");
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.log_format, "pretty");
}

#[test]
fn severity_hook_accepts_any_letter_case() {
    let config: ServiceConfig = load_from_str("{ log_level: \"debug\" }").expect("config");
    assert_eq!(config.log_level, LogLevel::Debug);

    let config: ServiceConfig = load_from_str("{ log_level: \"Warn\" }").expect("config");
    assert_eq!(config.log_level, LogLevel::Warn);
}

#[test]
fn severity_hook_rejection_names_key_and_value() {
    let err = load_from_str::<ServiceConfig>("{ log_level: \"not-a-level\" }").unwrap_err();
    assert!(matches!(err, ConfigError::Decode { .. }));
    let msg = err.to_string();
    assert!(msg.contains("log_level"));
    assert!(msg.contains("not-a-level"));
}

/// Without the hook the value passes through to the default decoder,
/// which only accepts canonical names.
#[test]
fn severity_without_hook_decodes_canonical_names_only() {
    let config: ServiceConfig = run(
        FileSource::Inline("{ log_level: \"WARN\" }".to_string()),
        EnvSource::empty(),
        &[],
    )
    .expect("config");
    assert_eq!(config.log_level, LogLevel::Warn);

    let err = run::<ServiceConfig>(
        FileSource::Inline("{ log_level: \"warn\" }".to_string()),
        EnvSource::empty(),
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DecodeFailed(_)));
}

#[test]
fn env_text_coerces_through_hooks() {
    let env = EnvSource::empty()
        .with_var("HTTP_PORT", "7070")
        .with_var("HTTP_REQUEST_LOGGING", "false");
    let config: ServiceConfig = run(
        FileSource::Inline("{}".to_string()),
        env,
        default_hooks(),
    )
    .expect("config");
    assert_eq!(config.http.port, 7070);
    assert!(!config.http.request_logging);
}

#[test]
fn list_where_scalar_is_a_decode_error() {
    let err = load_from_str::<ServiceConfig>("{ http: { port: [1, 2] } }").unwrap_err();
    assert!(matches!(err, ConfigError::Decode { .. }));
    assert!(err.to_string().contains("http.port"));
}

#[test]
fn object_where_scalar_is_a_decode_error() {
    let err = load_from_str::<ServiceConfig>("{ log_format: { nested: true } }").unwrap_err();
    assert!(matches!(err, ConfigError::Decode { .. }));
    assert!(err.to_string().contains("log_format"));
}

/// All violations are reported together, each under its dotted key.
#[test]
fn validation_reports_every_violation() {
    let err =
        load_from_str::<ServiceConfig>("{ log_format: \"xml\", http: { host: \"\" } }").unwrap_err();
    let ConfigError::Validation(violations) = &err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(violations.0.len(), 2);
    assert_eq!(violations.0[0].key, "http.host");
    assert_eq!(violations.0[0].rule, "required");
    assert_eq!(violations.0[1].key, "log_format");
    assert_eq!(violations.0[1].rule, "one_of");
}

#[test]
fn validation_checks_integer_bounds() {
    let err = load_from_str::<ServiceConfig>("{ http: { port: 0 } }").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("http.port"));
    assert!(msg.contains("min"));
}
