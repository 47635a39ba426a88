//! Export definitions and their bindings to parts.

use super::metadata::{Metadata, MetadataValue};
use super::part::PartDefinition;
use super::types::{MemberRef, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A capability a part offers under a named contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportDefinition {
    /// Contract name exports and imports are matched on.
    pub contract_name: String,
    /// Type of the exported value.
    pub contract_type: TypeRef,
    /// Export metadata.
    pub metadata: Metadata,
}

impl ExportDefinition {
    /// Create an export without metadata.
    pub fn new(contract_name: impl Into<String>, contract_type: TypeRef) -> Self {
        Self {
            contract_name: contract_name.into(),
            contract_type,
            metadata: Metadata::new(),
        }
    }

    /// Create an export whose contract name is its type's identity.
    pub fn of_type(contract_type: TypeRef) -> Self {
        Self::new(contract_type.identity(), contract_type)
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get a metadata value.
    pub fn get_metadata(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }
}

/// An export bound to the part that declares it.
#[derive(Debug, Clone)]
pub struct ExportDefinitionBinding {
    /// The export.
    pub export: ExportDefinition,
    /// The declaring part.
    pub part: Arc<PartDefinition>,
    /// The member producing the export; `None` when the part itself is exported.
    pub member: Option<MemberRef>,
}

impl ExportDefinitionBinding {
    /// Bind an export to its part and optional member.
    pub fn new(export: ExportDefinition, part: Arc<PartDefinition>, member: Option<MemberRef>) -> Self {
        Self {
            export,
            part,
            member,
        }
    }

    /// Whether the part type itself is the exported value.
    pub fn is_static_export(&self) -> bool {
        self.member.is_none()
    }
}

impl PartialEq for ExportDefinitionBinding {
    fn eq(&self, other: &Self) -> bool {
        self.export == other.export
            && self.member == other.member
            && (Arc::ptr_eq(&self.part, &other.part) || self.part == other.part)
    }
}

impl Eq for ExportDefinitionBinding {}

impl Hash for ExportDefinitionBinding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.export.hash(state);
        self.part.part_type.hash(state);
        self.member.hash(state);
    }
}

impl fmt::Display for ExportDefinitionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{} <- {}", self.export.contract_name, member),
            None => write!(f, "{} <- {}", self.export.contract_name, self.part.part_type),
        }
    }
}
