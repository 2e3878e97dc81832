//! Decode pipeline: merged raw values into the destination schema type.

use super::walk::{Leaf, derive_kind};
use crate::{ConfigError, ConfigSchema, LeafKind, LogLevel};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A type-pair decode conversion.
///
/// Each variant names one (source representation, destination kind)
/// pair; a hook runs only when both sides of its pair match the value at
/// hand, otherwise the value passes through to the structural converter.
/// The set is closed: dispatch is a checked match over these variants,
/// not open-ended type probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeHook {
    /// Text into severity: case-insensitive log level names.
    SeverityName,
    /// Text into integer: numeric text, e.g. environment-supplied ports.
    IntegerText,
    /// Text into float.
    FloatText,
    /// Text into boolean: `true`/`false`/`1`/`0`, any case.
    BooleanText,
}

impl DecodeHook {
    /// The (source, destination) pair this hook converts.
    fn pair(self) -> (LeafKind, LeafKind) {
        match self {
            DecodeHook::SeverityName => (LeafKind::Text, LeafKind::Severity),
            DecodeHook::IntegerText => (LeafKind::Text, LeafKind::Integer),
            DecodeHook::FloatText => (LeafKind::Text, LeafKind::Float),
            DecodeHook::BooleanText => (LeafKind::Text, LeafKind::Boolean),
        }
    }

    /// Apply the conversion to a matching textual raw value.
    fn apply(self, key: &str, raw: &str) -> Result<Value, ConfigError> {
        match self {
            DecodeHook::SeverityName => {
                let level = LogLevel::from_str(raw)
                    .map_err(|err| decode_error(key, raw, err.to_string()))?;
                Ok(Value::String(level.as_str().to_string()))
            }
            DecodeHook::IntegerText => match raw.trim().parse::<i64>() {
                Ok(parsed) => Ok(Value::from(parsed)),
                Err(_) => Err(decode_error(key, raw, "expected an integer")),
            },
            DecodeHook::FloatText => match raw.trim().parse::<f64>() {
                Ok(parsed) => Ok(Value::from(parsed)),
                Err(_) => Err(decode_error(key, raw, "expected a number")),
            },
            DecodeHook::BooleanText => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(decode_error(key, raw, "expected a boolean")),
            },
        }
    }
}

/// The hook table installed by default.
pub fn default_hooks() -> &'static [DecodeHook] {
    &[
        DecodeHook::SeverityName,
        DecodeHook::IntegerText,
        DecodeHook::FloatText,
        DecodeHook::BooleanText,
    ]
}

/// Convert the merged mapping into the destination type.
///
/// Each leaf is converted through a matching hook or the structural
/// converter, reassembled into a nested tree, and deserialized as one
/// unit. The first failing leaf aborts the decode; no partial object is
/// ever produced.
pub(super) fn decode<T: ConfigSchema>(
    merged: &BTreeMap<String, Value>,
    leaves: &[Leaf],
    hooks: &[DecodeHook],
) -> Result<T, ConfigError> {
    let mut tree = Value::Object(Map::new());
    for leaf in leaves {
        let Some(raw) = merged.get(&leaf.key) else {
            continue;
        };
        let converted = convert_leaf(&leaf.key, raw, leaf.kind, hooks)?;
        insert_path(&mut tree, &leaf.key, converted);
    }
    Ok(serde_json::from_value(tree)?)
}

/// Convert one leaf value via a matching hook, falling back to the
/// structural converter.
fn convert_leaf(
    key: &str,
    raw: &Value,
    kind: LeafKind,
    hooks: &[DecodeHook],
) -> Result<Value, ConfigError> {
    // Absent in every layer: the destination type's default applies.
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let Some(source) = derive_kind(raw) else {
        return Err(decode_error(
            key,
            raw.to_string(),
            format!("expected {}, found an object", kind.describe()),
        ));
    };

    if let Some(hook) = hooks.iter().find(|hook| hook.pair() == (source, kind)) {
        if let Some(text) = raw.as_str() {
            return hook.apply(key, text);
        }
    }

    match (source, kind) {
        (source, kind) if source == kind => Ok(raw.clone()),
        // Without the severity hook only canonical names decode; the
        // value passes through to the destination type untouched.
        (LeafKind::Text, LeafKind::Severity) => Ok(raw.clone()),
        (LeafKind::Integer, LeafKind::Float) => Ok(raw.clone()),
        _ => Err(decode_error(
            key,
            render(raw),
            format!("expected {}, found {}", kind.describe(), source.describe()),
        )),
    }
}

/// Insert a value at a dotted path, creating intermediate objects.
fn insert_path(tree: &mut Value, key: &str, value: Value) {
    let segments: Vec<&str> = key.split('.').collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = tree;
    for segment in parents {
        let Some(map) = current.as_object_mut() else {
            return;
        };
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(map) = current.as_object_mut() {
        map.insert(leaf.to_string(), value);
    }
}

/// Raw value rendered for error messages.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Build a structured decode error naming the offending key and value.
fn decode_error(key: &str, value: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Decode {
        key: key.to_string(),
        value: value.into(),
        message: message.into(),
    }
}
