//! Closing open-generic exports over concrete type arguments.
//!
//! An import of a closed generic contract (`IHandler<int>`) may be satisfied
//! by a part that exports the open contract (`IHandler<T>`). Such an import
//! carries two reserved metadata entries naming the open contract and the
//! type arguments; the resolver looks up the open contract's bindings and
//! rewrites each one for those arguments.

use super::export::{ExportDefinition, ExportDefinitionBinding};
use super::import::ImportDefinition;
use super::metadata::{format_placeholders, keys, Metadata, MetadataValue};
use super::types::TypeRef;
use crate::config::GenericMetadataKeys;
use crate::error::Error;
use tracing::debug;

/// The open contract an import's closed generic contract derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenGenericTarget {
    /// Contract name the open-generic exports are registered under.
    pub contract_name: String,
    /// Type arguments closing the open contract, in parameter order.
    pub type_arguments: Vec<TypeRef>,
}

impl OpenGenericTarget {
    /// Read the reserved generic entries from an import's metadata.
    ///
    /// Returns `None` when either entry is absent, or when the entries are
    /// not a string and a list of types. Such an import is matched on its
    /// contract name only.
    pub fn from_import(import: &ImportDefinition, reserved: &GenericMetadataKeys) -> Option<Self> {
        let name = import.metadata.get(&reserved.contract_name)?;
        let arguments = import.metadata.get(&reserved.type_arguments)?;

        match (name.as_str(), arguments.as_type_list()) {
            (Some(contract_name), Some(type_arguments)) => Some(Self {
                contract_name: contract_name.to_string(),
                type_arguments,
            }),
            _ => {
                debug!(
                    contract = %import.contract_name,
                    %name,
                    %arguments,
                    "ignoring malformed generic import metadata"
                );
                None
            }
        }
    }
}

impl ExportDefinition {
    /// Number of type arguments needed to close this export.
    ///
    /// Covers the contract type and every placeholder in type-valued metadata.
    pub fn generic_arity(&self) -> usize {
        self.metadata
            .values()
            .map(MetadataValue::parameter_count)
            .fold(self.contract_type.generic_arity(), usize::max)
    }

    /// Close this open-generic export over `type_arguments`.
    ///
    /// The contract type is closed structurally, `{n}` placeholders in the
    /// contract name and type-identity metadata are formatted with the
    /// argument identities, and placeholders in type-valued metadata are
    /// substituted. Generic definitions in metadata are left open.
    pub fn close_generic(&self, type_arguments: &[TypeRef]) -> Result<ExportDefinition, Error> {
        let expected = self.generic_arity();
        if expected != type_arguments.len() {
            return Err(Error::ArityMismatch {
                contract: self.contract_name.clone(),
                expected,
                actual: type_arguments.len(),
            });
        }

        let metadata: Metadata = self
            .metadata
            .iter()
            .map(|(key, value)| {
                let closed = match value {
                    MetadataValue::String(identity) if key == keys::EXPORT_TYPE_IDENTITY => {
                        MetadataValue::String(format_placeholders(identity, type_arguments))
                    }
                    other => other.substitute(type_arguments),
                };
                (key.clone(), closed)
            })
            .collect();

        Ok(ExportDefinition {
            contract_name: format_placeholders(&self.contract_name, type_arguments),
            contract_type: self.contract_type.close(type_arguments),
            metadata,
        })
    }
}

impl ExportDefinitionBinding {
    /// Close this binding's open-generic export over `type_arguments`.
    ///
    /// The declaring part and exporting member are kept as they are.
    pub fn close_generic(&self, type_arguments: &[TypeRef]) -> Result<ExportDefinitionBinding, Error> {
        Ok(ExportDefinitionBinding {
            export: self.export.close_generic(type_arguments)?,
            part: self.part.clone(),
            member: self.member.clone(),
        })
    }
}
