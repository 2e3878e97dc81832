//! Helpers shared across the loader pipeline.

use serde_json::Value;

/// Join nested key paths.
pub(super) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Look up a dotted key inside a nested value tree.
pub(super) fn lookup_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in key.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
