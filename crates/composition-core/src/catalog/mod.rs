//! Part catalog and export resolution.
//!
//! The catalog holds discovered parts and indexes their exports by contract
//! name so imports can be matched against them, including imports of closed
//! generic contracts served by open-generic exports.

mod catalog;
mod constraint;
mod discovery;
mod dump;
mod export;
mod generic;
mod import;
mod index;
mod metadata;
mod part;
mod snapshot;
mod types;

pub use catalog::ComposableCatalog;
pub use constraint::ExportConstraint;
pub use discovery::{DiscoveredParts, PartDiscoveryError};
pub use export::{ExportDefinition, ExportDefinitionBinding};
pub use generic::OpenGenericTarget;
pub use import::{Cardinality, ImportDefinition, ImportDefinitionBinding};
pub use index::{BindingList, ExportIndex};
pub use metadata::{format_placeholders, keys, Metadata, MetadataValue};
pub use part::{CreationPolicy, PartDefinition};
pub use snapshot::SNAPSHOT_FORMAT_VERSION;
pub use types::{MemberKind, MemberRef, ModuleId, NamedType, TypeRef};
