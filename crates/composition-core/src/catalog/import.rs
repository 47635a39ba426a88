//! Import definitions.

use super::constraint::ExportConstraint;
use super::metadata::{keys, Metadata, MetadataValue};
use super::types::{MemberRef, ModuleId, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How many exports an import expects.
///
/// Carried for the graph compiler; matching never enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// Zero or one export.
    ZeroOrOne,
    /// Exactly one export.
    #[default]
    ExactlyOne,
    /// Any number of exports.
    ZeroOrMore,
}

/// A capability a part requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportDefinition {
    /// Contract name to match against exports.
    pub contract_name: String,
    /// Expected number of matches.
    pub cardinality: Cardinality,
    /// Import metadata, including the reserved generic entries when present.
    pub metadata: Metadata,
    /// Constraints every matching export must satisfy.
    pub export_constraints: Vec<ExportConstraint>,
}

impl ImportDefinition {
    /// Create an import of a contract.
    pub fn new(contract_name: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            contract_name: contract_name.into(),
            cardinality,
            metadata: Metadata::new(),
            export_constraints: Vec::new(),
        }
    }

    /// Create an import of exactly one export of `contract_name`.
    pub fn exactly_one(contract_name: impl Into<String>) -> Self {
        Self::new(contract_name, Cardinality::ExactlyOne)
    }

    /// Create an import of any number of exports of `contract_name`.
    pub fn many(contract_name: impl Into<String>) -> Self {
        Self::new(contract_name, Cardinality::ZeroOrMore)
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: ExportConstraint) -> Self {
        self.export_constraints.push(constraint);
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Mark this import as targeting a closure of an open-generic contract.
    ///
    /// Sets the reserved generic contract name and type argument entries
    /// under their default keys.
    pub fn for_closed_generic(
        self,
        open_contract_name: impl Into<String>,
        type_arguments: impl IntoIterator<Item = TypeRef>,
    ) -> Self {
        self.with_metadata(
            keys::GENERIC_CONTRACT_NAME,
            MetadataValue::String(open_contract_name.into()),
        )
        .with_metadata(keys::GENERIC_PARAMETERS, MetadataValue::types(type_arguments))
    }

    /// Add every module referenced by this import's metadata and constraints.
    pub fn collect_modules(&self, modules: &mut HashSet<ModuleId>) {
        for value in self.metadata.values() {
            collect_value_modules(value, modules);
        }
        for constraint in &self.export_constraints {
            match constraint {
                ExportConstraint::ContractType { contract_type } => {
                    contract_type.collect_modules(modules)
                }
                ExportConstraint::MetadataEquals { value, .. } => {
                    collect_value_modules(value, modules)
                }
                ExportConstraint::TypeIdentity { .. }
                | ExportConstraint::MetadataPresent { .. } => {}
            }
        }
    }
}

pub(crate) fn collect_value_modules(value: &MetadataValue, modules: &mut HashSet<ModuleId>) {
    match value {
        MetadataValue::Type(t) => t.collect_modules(modules),
        MetadataValue::List(items) => {
            for item in items {
                collect_value_modules(item, modules);
            }
        }
        _ => {}
    }
}

impl fmt::Display for ImportDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.contract_name, self.cardinality)
    }
}

/// An import bound to the site in a part that receives it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportDefinitionBinding {
    /// The import.
    pub import: ImportDefinition,
    /// Member receiving the import; `None` for constructor imports.
    pub member: Option<MemberRef>,
    /// Declared type of the receiving site.
    pub site_type: TypeRef,
}

impl ImportDefinitionBinding {
    /// Bind an import to a receiving member.
    pub fn member(import: ImportDefinition, member: MemberRef, site_type: TypeRef) -> Self {
        Self {
            import,
            member: Some(member),
            site_type,
        }
    }

    /// Bind an import to a constructor parameter.
    pub fn constructor(import: ImportDefinition, site_type: TypeRef) -> Self {
        Self {
            import,
            member: None,
            site_type,
        }
    }

    /// Add every module this import binding refers to.
    pub fn collect_modules(&self, modules: &mut HashSet<ModuleId>) {
        self.import.collect_modules(modules);
        self.site_type.collect_modules(modules);
        if let Some(member) = &self.member {
            member.declaring_type.collect_modules(modules);
        }
    }
}
