//! Export and import metadata.

use super::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved metadata key names.
pub mod keys {
    /// On an import: the open-generic contract name its closed contract derives from.
    pub const GENERIC_CONTRACT_NAME: &str = "GenericContractName";

    /// On an import: the ordered type arguments that close the generic contract.
    pub const GENERIC_PARAMETERS: &str = "GenericParameters";

    /// On an export: the identity of the exported type.
    pub const EXPORT_TYPE_IDENTITY: &str = "ExportTypeIdentity";
}

/// Metadata attached to exports, imports, and parts.
///
/// Keys are kept sorted so equal maps hash and serialize identically.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// String value.
    String(String),
    /// A type reference.
    Type(TypeRef),
    /// An ordered list of values.
    List(Vec<MetadataValue>),
}

impl MetadataValue {
    /// Build a list of type values.
    pub fn types(types: impl IntoIterator<Item = TypeRef>) -> Self {
        MetadataValue::List(types.into_iter().map(MetadataValue::Type).collect())
    }

    /// Get the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type payload, if this is a type.
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            MetadataValue::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Interpret this value as an ordered list of types.
    ///
    /// Returns `None` unless this is a list whose every element is a type.
    pub fn as_type_list(&self) -> Option<Vec<TypeRef>> {
        match self {
            MetadataValue::List(items) => items.iter().map(|v| v.as_type().cloned()).collect(),
            _ => None,
        }
    }

    /// Number of type arguments needed to bind every placeholder this value holds.
    pub fn parameter_count(&self) -> usize {
        match self {
            MetadataValue::Type(t) => t.parameter_count(),
            MetadataValue::List(items) => items
                .iter()
                .map(MetadataValue::parameter_count)
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Substitute type arguments for the placeholders in every type this value holds.
    pub fn substitute(&self, arguments: &[TypeRef]) -> MetadataValue {
        match self {
            MetadataValue::Type(t) => MetadataValue::Type(t.substitute(arguments)),
            MetadataValue::List(items) => {
                MetadataValue::List(items.iter().map(|v| v.substitute(arguments)).collect())
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Null => f.write_str("null"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Int(i) => write!(f, "{i}"),
            MetadataValue::String(s) => write!(f, "{s:?}"),
            MetadataValue::Type(t) => write!(f, "{t}"),
            MetadataValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<TypeRef> for MetadataValue {
    fn from(value: TypeRef) -> Self {
        MetadataValue::Type(value)
    }
}

/// Replace positional `{n}` placeholders with the identities of `arguments`.
///
/// Placeholders whose index is out of range, and braces that do not form a
/// placeholder, are copied through unchanged.
pub fn format_placeholders(template: &str, arguments: &[TypeRef]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let replaced = tail.find('}').and_then(|close| {
            let digits = &tail[..close];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index: usize = digits.parse().ok()?;
            arguments.get(index).map(|arg| (arg.identity(), close))
        });

        match replaced {
            Some((identity, close)) => {
                out.push_str(&identity);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
