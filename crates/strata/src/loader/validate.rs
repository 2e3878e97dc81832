//! Declarative validation of the decoded object.

use super::utils::lookup_path;
use super::walk::Leaf;
use crate::error::{Violation, Violations};
use crate::{ConfigError, ConfigSchema, Rule};
use serde_json::Value;

/// Apply every declared rule to the decoded object.
///
/// The object is rendered back through serde so rules see the same value
/// shapes files and environment variables produce. Violations are
/// accumulated and reported together, each naming its dotted
/// configuration key rather than an internal field name.
pub(super) fn validate<T: ConfigSchema>(config: &T, leaves: &[Leaf]) -> Result<(), ConfigError> {
    let tree = serde_json::to_value(config)?;
    let mut violations = Vec::new();
    for leaf in leaves {
        let value = lookup_path(&tree, &leaf.key);
        for rule in leaf.rules {
            if let Some(violation) = check_rule(&leaf.key, *rule, value) {
                violations.push(violation);
            }
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(Violations(violations)))
    }
}

/// Check one rule against a leaf's rendered value.
fn check_rule(key: &str, rule: Rule, value: Option<&Value>) -> Option<Violation> {
    match rule {
        Rule::Required => {
            let missing = match value {
                None | Some(Value::Null) => true,
                Some(Value::String(text)) => text.is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            };
            missing.then(|| violation(key, rule, "a value is required".to_string()))
        }
        Rule::OneOf(allowed) => match value {
            Some(Value::String(text)) if !allowed.contains(&text.as_str()) => Some(violation(
                key,
                rule,
                format!("must be one of {}", allowed.join(", ")),
            )),
            _ => None,
        },
        Rule::Min(min) => match value.and_then(Value::as_i64) {
            Some(number) if number < min => {
                Some(violation(key, rule, format!("must be at least {min}")))
            }
            _ => None,
        },
        Rule::Max(max) => match value.and_then(Value::as_i64) {
            Some(number) if number > max => {
                Some(violation(key, rule, format!("must be at most {max}")))
            }
            _ => None,
        },
    }
}

fn violation(key: &str, rule: Rule, message: String) -> Violation {
    Violation {
        key: key.to_string(),
        rule: rule.name(),
        message,
    }
}
