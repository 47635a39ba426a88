//! Part definitions.

use super::dump::IndentWriter;
use super::export::{ExportDefinition, ExportDefinitionBinding};
use super::import::{collect_value_modules, ImportDefinitionBinding};
use super::metadata::{Metadata, MetadataValue};
use super::types::{MemberRef, ModuleId, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Write};
use std::sync::Arc;

/// How instances of a part are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CreationPolicy {
    /// Let the importer decide.
    #[default]
    Any,
    /// One instance per sharing boundary.
    Shared,
    /// A new instance per import.
    NonShared,
}

/// A discovered part: a type with the exports and imports it declares.
///
/// Identity is by value; two definitions describing the same part compare
/// and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartDefinition {
    /// The part's own type.
    pub part_type: TypeRef,
    /// Exports attached to the part type itself.
    pub exported_types: Vec<ExportDefinition>,
    /// Exports attached to members, in declaration order.
    pub exporting_members: Vec<(MemberRef, Vec<ExportDefinition>)>,
    /// Imports the part declares.
    pub imports: Vec<ImportDefinitionBinding>,
    /// Instance sharing policy.
    pub creation_policy: CreationPolicy,
    /// Sharing boundary the part's shared instances belong to.
    pub sharing_boundary: Option<String>,
    /// Part-level metadata.
    pub metadata: Metadata,
}

impl PartDefinition {
    /// Create a part with no exports or imports.
    pub fn new(part_type: TypeRef) -> Self {
        Self {
            part_type,
            exported_types: Vec::new(),
            exporting_members: Vec::new(),
            imports: Vec::new(),
            creation_policy: CreationPolicy::default(),
            sharing_boundary: None,
            metadata: Metadata::new(),
        }
    }

    /// Export the part type itself.
    pub fn with_export(mut self, export: ExportDefinition) -> Self {
        self.exported_types.push(export);
        self
    }

    /// Export from a member.
    ///
    /// Exports added for a member already present are appended to that
    /// member's list.
    pub fn with_member_export(mut self, member: MemberRef, export: ExportDefinition) -> Self {
        match self.exporting_members.iter_mut().find(|(m, _)| *m == member) {
            Some((_, exports)) => exports.push(export),
            None => self.exporting_members.push((member, vec![export])),
        }
        self
    }

    /// Add an import.
    pub fn with_import(mut self, import: ImportDefinitionBinding) -> Self {
        self.imports.push(import);
        self
    }

    /// Set the creation policy.
    pub fn with_creation_policy(mut self, policy: CreationPolicy) -> Self {
        self.creation_policy = policy;
        self
    }

    /// Set the sharing boundary.
    pub fn with_sharing_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.sharing_boundary = Some(boundary.into());
        self
    }

    /// Add a part metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Total number of exports the part declares.
    pub fn export_count(&self) -> usize {
        self.exported_types.len()
            + self
                .exporting_members
                .iter()
                .map(|(_, exports)| exports.len())
                .sum::<usize>()
    }

    /// Every export of this part bound to it, type exports first, then
    /// member exports in declaration order.
    pub fn export_bindings(self: &Arc<Self>) -> impl Iterator<Item = ExportDefinitionBinding> + '_ {
        let own = self
            .exported_types
            .iter()
            .map(move |export| ExportDefinitionBinding::new(export.clone(), Arc::clone(self), None));
        let members = self.exporting_members.iter().flat_map(move |(member, exports)| {
            exports.iter().map(move |export| {
                ExportDefinitionBinding::new(export.clone(), Arc::clone(self), Some(member.clone()))
            })
        });
        own.chain(members)
    }

    /// Add every module this part's type, exports, and imports refer to.
    pub fn collect_input_modules(&self, modules: &mut HashSet<ModuleId>) {
        self.part_type.collect_modules(modules);

        for export in &self.exported_types {
            collect_export_modules(export, modules);
        }
        for (member, exports) in &self.exporting_members {
            member.declaring_type.collect_modules(modules);
            for export in exports {
                collect_export_modules(export, modules);
            }
        }
        for import in &self.imports {
            import.collect_modules(modules);
        }
    }

    pub(crate) fn describe<W: Write>(&self, w: &mut IndentWriter<'_, W>) -> fmt::Result {
        w.line(format_args!("Type: {}", self.part_type))?;
        w.line(format_args!("CreationPolicy: {:?}", self.creation_policy))?;
        if let Some(boundary) = &self.sharing_boundary {
            w.line(format_args!("SharingBoundary: {boundary}"))?;
        }
        w.line(format_args!("ExportedTypes:"))?;
        w.indented(|w| {
            for export in &self.exported_types {
                describe_export(w, export)?;
            }
            Ok(())
        })?;
        w.line(format_args!("ExportingMembers:"))?;
        w.indented(|w| {
            for (member, exports) in &self.exporting_members {
                w.line(format_args!("{member}"))?;
                w.indented(|w| {
                    for export in exports {
                        describe_export(w, export)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        w.line(format_args!("Imports:"))?;
        w.indented(|w| {
            for import in &self.imports {
                match &import.member {
                    Some(member) => w.line(format_args!("{} -> {member}", import.import))?,
                    None => w.line(format_args!("{} -> (constructor)", import.import))?,
                }
            }
            Ok(())
        })
    }
}

fn collect_export_modules(export: &ExportDefinition, modules: &mut HashSet<ModuleId>) {
    export.contract_type.collect_modules(modules);
    for value in export.metadata.values() {
        collect_value_modules(value, modules);
    }
}

fn describe_export<W: Write>(w: &mut IndentWriter<'_, W>, export: &ExportDefinition) -> fmt::Result {
    w.line(format_args!("{} : {}", export.contract_name, export.contract_type))?;
    w.indented(|w| {
        for (key, value) in &export.metadata {
            w.line(format_args!("{key} = {value}"))?;
        }
        Ok(())
    })
}
