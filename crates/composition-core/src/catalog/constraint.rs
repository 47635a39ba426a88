//! Constraints an import places on candidate exports.

use super::export::ExportDefinition;
use super::metadata::{keys, MetadataValue};
use super::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A predicate over an export definition.
///
/// Constraints are pure: evaluating one never has side effects, so an
/// import's constraint list can be evaluated in any order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportConstraint {
    /// The export's contract type must equal the given type.
    ContractType {
        /// Required contract type.
        contract_type: TypeRef,
    },
    /// The export's type-identity metadata must equal the given identity.
    TypeIdentity {
        /// Required type identity.
        identity: String,
    },
    /// The export must carry a metadata entry with the given value.
    MetadataEquals {
        /// Metadata key.
        key: String,
        /// Required value.
        value: MetadataValue,
    },
    /// The export must carry a metadata entry under the given key.
    MetadataPresent {
        /// Metadata key.
        key: String,
    },
}

impl ExportConstraint {
    /// Require an exact contract type.
    pub fn contract_type(contract_type: TypeRef) -> Self {
        ExportConstraint::ContractType { contract_type }
    }

    /// Require a type identity.
    pub fn type_identity(identity: impl Into<String>) -> Self {
        ExportConstraint::TypeIdentity {
            identity: identity.into(),
        }
    }

    /// Require a metadata value.
    pub fn metadata_equals(key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        ExportConstraint::MetadataEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Require a metadata key.
    pub fn metadata_present(key: impl Into<String>) -> Self {
        ExportConstraint::MetadataPresent { key: key.into() }
    }

    /// Check whether `export` satisfies this constraint.
    pub fn is_satisfied_by(&self, export: &ExportDefinition) -> bool {
        match self {
            ExportConstraint::ContractType { contract_type } => {
                export.contract_type == *contract_type
            }
            ExportConstraint::TypeIdentity { identity } => {
                match export.get_metadata(keys::EXPORT_TYPE_IDENTITY) {
                    Some(value) => value.as_str() == Some(identity.as_str()),
                    None => export.contract_type.identity() == *identity,
                }
            }
            ExportConstraint::MetadataEquals { key, value } => {
                export.get_metadata(key) == Some(value)
            }
            ExportConstraint::MetadataPresent { key } => export.metadata.contains_key(key),
        }
    }

    /// Check whether `export` satisfies every constraint in `constraints`.
    pub fn all_satisfied_by(constraints: &[ExportConstraint], export: &ExportDefinition) -> bool {
        constraints.iter().all(|c| c.is_satisfied_by(export))
    }
}

impl fmt::Display for ExportConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportConstraint::ContractType { contract_type } => {
                write!(f, "contract type is {contract_type}")
            }
            ExportConstraint::TypeIdentity { identity } => write!(f, "type identity is {identity}"),
            ExportConstraint::MetadataEquals { key, value } => write!(f, "{key} = {value}"),
            ExportConstraint::MetadataPresent { key } => write!(f, "has {key}"),
        }
    }
}
