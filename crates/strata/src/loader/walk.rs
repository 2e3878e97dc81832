//! Schema walking: derive the flat key space from a schema type.

use super::utils::join_key;
use crate::{ConfigError, ConfigSchema, FieldMeta, LeafKind, Rule};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A leaf field discovered by walking a schema's default value tree.
#[derive(Debug, Clone)]
pub(super) struct Leaf {
    /// Dotted key path.
    pub key: String,
    /// Default value declared by the schema.
    pub default: Value,
    /// Destination kind, derived from the default or declared in metadata.
    pub kind: LeafKind,
    /// Validation rules declared for this leaf.
    pub rules: &'static [Rule],
}

/// Walk a schema type into its flat list of leaves.
///
/// The default instance is serialized and its value tree walked
/// recursively to arbitrary depth; every non-object node is a leaf.
/// Field metadata is folded in and cross-checked against the derived key
/// space: drift between the two is a programmer error and fails the load
/// immediately.
pub(super) fn walk_schema<T: ConfigSchema>() -> Result<Vec<Leaf>, ConfigError> {
    let tree = serde_json::to_value(T::default())
        .map_err(|err| ConfigError::Schema(format!("schema default did not serialize: {err}")))?;
    let Value::Object(map) = tree else {
        return Err(ConfigError::Schema(
            "schema root must serialize to an object".to_string(),
        ));
    };

    let mut nodes = Vec::new();
    walk_object("", &map, &mut nodes);

    let mut metadata: BTreeMap<&str, &FieldMeta> = BTreeMap::new();
    for meta in T::fields() {
        if metadata.insert(meta.key, meta).is_some() {
            return Err(ConfigError::Schema(format!(
                "duplicate field metadata for \"{}\"",
                meta.key
            )));
        }
    }

    let mut leaves = Vec::with_capacity(nodes.len());
    for (key, default) in nodes {
        let derived = derive_kind(&default);
        let meta = metadata.remove(key.as_str());
        let declared = meta.and_then(|meta| meta.kind);
        let kind = match (derived, declared) {
            (derived, Some(declared)) => {
                if !kind_compatible(derived, declared) {
                    return Err(ConfigError::Schema(format!(
                        "declared kind for \"{key}\" contradicts its default value"
                    )));
                }
                declared
            }
            (Some(derived), None) => derived,
            (None, None) => {
                return Err(ConfigError::Schema(format!(
                    "cannot derive a kind for \"{key}\"; declare one in field metadata"
                )));
            }
        };
        let rules = meta.map(|meta| meta.rules).unwrap_or(&[]);
        check_rules(&key, kind, rules)?;
        leaves.push(Leaf {
            key,
            default,
            kind,
            rules,
        });
    }

    if let Some(key) = metadata.keys().next() {
        return Err(ConfigError::Schema(format!(
            "field metadata names unknown key \"{key}\""
        )));
    }

    Ok(leaves)
}

/// Recurse through an object, collecting (dotted key, default) pairs.
fn walk_object(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let path = join_key(prefix, key);
        match value {
            Value::Object(nested) => walk_object(&path, nested, out),
            _ => out.push((path, value.clone())),
        }
    }
}

/// Derive a leaf kind from its default value, when possible.
///
/// Null defaults carry no kind of their own and require a metadata
/// declaration.
pub(super) fn derive_kind(value: &Value) -> Option<LeafKind> {
    match value {
        Value::String(_) => Some(LeafKind::Text),
        Value::Bool(_) => Some(LeafKind::Boolean),
        Value::Number(number) if number.is_f64() => Some(LeafKind::Float),
        Value::Number(_) => Some(LeafKind::Integer),
        Value::Array(_) => Some(LeafKind::List),
        Value::Null | Value::Object(_) => None,
    }
}

/// Check a metadata kind declaration against the derived kind.
fn kind_compatible(derived: Option<LeafKind>, declared: LeafKind) -> bool {
    match (derived, declared) {
        (None, _) => true,
        // Severity leaves serialize as their textual name.
        (Some(LeafKind::Text), LeafKind::Severity) => true,
        // An integer default is fine for a float field.
        (Some(LeafKind::Integer), LeafKind::Float) => true,
        (Some(derived), declared) => derived == declared,
    }
}

/// Reject rules declared on leaves they cannot apply to.
fn check_rules(key: &str, kind: LeafKind, rules: &[Rule]) -> Result<(), ConfigError> {
    for rule in rules {
        let valid = match rule {
            Rule::Required => true,
            Rule::OneOf(_) => matches!(kind, LeafKind::Text | LeafKind::Severity),
            Rule::Min(_) | Rule::Max(_) => kind == LeafKind::Integer,
        };
        if !valid {
            return Err(ConfigError::Schema(format!(
                "rule \"{}\" does not apply to \"{key}\" ({})",
                rule.name(),
                kind.describe()
            )));
        }
    }
    Ok(())
}
