//! Schema contract for configuration types.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Contract implemented by configuration schema types.
///
/// Key names and defaults derive from the type's `Default` and
/// `Serialize` impls: the loader serializes the default instance and
/// walks the resulting value tree, so the key space cannot drift from the
/// struct declaration. Nested structs become nested key segments; fields
/// marked `#[serde(skip)]` never bind to configuration.
///
/// [`ConfigSchema::fields`] supplies the per-leaf metadata serde cannot
/// express: destination-kind overrides for decode hooks and validation
/// rules. Metadata is cross-checked against the walked tree when a load
/// starts; an entry naming a key the schema does not declare, or a kind
/// its default value cannot represent, fails the load with
/// [`ConfigError::Schema`](crate::ConfigError::Schema).
pub trait ConfigSchema: Default + Serialize + DeserializeOwned {
    /// Per-leaf metadata, keyed by dotted path.
    fn fields() -> &'static [FieldMeta] {
        &[]
    }
}

/// Declarative metadata for a single leaf field.
#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    /// Dotted key path of the leaf.
    pub key: &'static str,
    /// Destination kind override; `None` keeps the kind derived from the
    /// field's default value.
    pub kind: Option<LeafKind>,
    /// Validation rules applied after decoding.
    pub rules: &'static [Rule],
}

/// Destination kind of a leaf field.
///
/// Drives decode-hook dispatch and structural conversion. Most kinds are
/// derived from the leaf's default value; kinds with a custom decode
/// representation (currently [`LeafKind::Severity`]) are declared through
/// [`FieldMeta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Free-form text.
    Text,
    /// Signed integer.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// List of values.
    List,
    /// Log severity name decoded into [`LogLevel`](crate::LogLevel).
    Severity,
}

impl LeafKind {
    /// Human-readable description used in decode errors.
    pub fn describe(self) -> &'static str {
        match self {
            LeafKind::Text => "text",
            LeafKind::Integer => "an integer",
            LeafKind::Float => "a number",
            LeafKind::Boolean => "a boolean",
            LeafKind::List => "a list",
            LeafKind::Severity => "a log level name",
        }
    }
}

/// A declarative validation rule attached to a leaf field.
///
/// Rules are checked against the decoded object; violations report the
/// leaf's dotted configuration key, never an internal field name.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// The value must be present and non-empty.
    Required,
    /// The rendered value must be one of the listed alternatives.
    /// Valid on text and severity leaves.
    OneOf(&'static [&'static str]),
    /// Inclusive lower bound. Valid on integer leaves.
    Min(i64),
    /// Inclusive upper bound. Valid on integer leaves.
    Max(i64),
}

impl Rule {
    /// Rule name used in violation reports.
    pub fn name(self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::OneOf(_) => "one_of",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
        }
    }
}
