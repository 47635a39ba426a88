//! Composition Core - Part catalog and export resolution.
//!
//! This crate provides the catalog half of a composition engine: an
//! immutable, incrementally maintained index of discovered parts that
//! answers which exports satisfy a given import.

pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::{
    BindingList, Cardinality, ComposableCatalog, CreationPolicy, DiscoveredParts, ExportConstraint,
    ExportDefinition, ExportDefinitionBinding, ExportIndex, ImportDefinition,
    ImportDefinitionBinding, MemberKind, MemberRef, Metadata, MetadataValue, ModuleId,
    PartDefinition, PartDiscoveryError, TypeRef,
};
pub use config::{CatalogConfig, GenericMetadataKeys};
pub use error::Error;
