//! The composable catalog: an immutable set of parts and their export index.

use super::constraint::ExportConstraint;
use super::discovery::{DiscoveredParts, PartDiscoveryError};
use super::dump::IndentWriter;
use super::export::ExportDefinitionBinding;
use super::generic::OpenGenericTarget;
use super::import::ImportDefinition;
use super::index::{BindingList, ExportIndex};
use super::part::PartDefinition;
use super::types::ModuleId;
use crate::config::CatalogConfig;
use crate::error::Error;
use indexmap::IndexSet;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// An immutable catalog of parts, indexed by the contracts they export.
///
/// Every mutator returns a new catalog and leaves `self` untouched. Parts and
/// the export index live in persistent `imbl` collections; an add copies
/// only the nodes it changes and older catalogs stay valid for readers.
///
/// Two catalogs are equal when they hold the same set of parts; the order
/// parts were added in, discovery errors, and configuration are ignored.
#[derive(Debug, Clone, Default)]
pub struct ComposableCatalog {
    /// Parts in the order they were first added.
    parts: imbl::Vector<Arc<PartDefinition>>,
    /// The same parts, for membership tests.
    members: imbl::HashSet<Arc<PartDefinition>>,
    /// Bindings by contract name, derived from `parts`.
    exports: ExportIndex,
    /// Errors carried over from discovery.
    diagnostics: Arc<Vec<PartDiscoveryError>>,
    /// Resolution and dump settings.
    config: Arc<CatalogConfig>,
}

impl ComposableCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `parts`.
    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<PartDefinition>>,
    {
        Self::new().with_parts(parts)
    }

    /// Create a catalog from a discovery result.
    pub fn from_discovered(discovered: DiscoveredParts) -> Self {
        Self::new().with_discovered_parts(discovered)
    }

    /// Parts in the catalog, in the order they were added.
    pub fn parts(&self) -> impl Iterator<Item = &Arc<PartDefinition>> {
        self.parts.iter()
    }

    /// Number of parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Whether the catalog holds no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether a part equal to `part` is in the catalog.
    pub fn contains(&self, part: &PartDefinition) -> bool {
        self.members.contains(part)
    }

    /// The export index.
    pub fn exports(&self) -> &ExportIndex {
        &self.exports
    }

    /// Bindings registered directly under `contract_name`.
    pub fn exports_for_contract(&self, contract_name: &str) -> &BindingList {
        self.exports.get(contract_name)
    }

    /// Errors reported by the discovery passes that fed this catalog.
    pub fn discovery_errors(&self) -> &[PartDiscoveryError] {
        &self.diagnostics
    }

    /// Fail with [`Error::Discovery`] if discovery reported any errors.
    pub fn ensure_no_discovery_errors(&self) -> Result<(), Error> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(Error::Discovery(self.diagnostics.to_vec()))
        }
    }

    /// Resolution settings.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Return a catalog with the same parts and different settings.
    pub fn with_config(&self, config: CatalogConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..self.clone()
        }
    }

    /// Whether `other` shares all of this catalog's storage.
    ///
    /// True for a catalog returned unchanged by a no-op add.
    pub fn ptr_eq(&self, other: &ComposableCatalog) -> bool {
        self.members.ptr_eq(&other.members)
            && self.exports.ptr_eq(&other.exports)
            && Arc::ptr_eq(&self.diagnostics, &other.diagnostics)
    }

    /// Add one part.
    ///
    /// Returns a clone of `self` if an equal part is already present.
    pub fn with_part(&self, part: impl Into<Arc<PartDefinition>>) -> Self {
        let part = part.into();
        if self.members.contains(&part) {
            trace!(part = %part.part_type, "part already in catalog");
            return self.clone();
        }

        let exports = self.exports.with_part(&part);
        let mut parts = self.parts.clone();
        let mut members = self.members.clone();
        members.insert(Arc::clone(&part));
        parts.push_back(part);

        Self {
            parts,
            members,
            exports,
            diagnostics: Arc::clone(&self.diagnostics),
            config: Arc::clone(&self.config),
        }
    }

    /// Add many parts in one pass.
    ///
    /// Equivalent to calling [`with_part`](Self::with_part) for each part in
    /// order, but every touched index list is extended once for the whole
    /// batch.
    #[instrument(skip_all, fields(existing = self.parts.len()))]
    pub fn with_parts<I>(&self, parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<PartDefinition>>,
    {
        let mut fresh: IndexSet<Arc<PartDefinition>> = IndexSet::new();
        let mut offered = 0usize;
        for part in parts {
            offered += 1;
            let part = part.into();
            if !self.members.contains(&part) {
                fresh.insert(part);
            }
        }

        if fresh.is_empty() {
            trace!(offered, "no new parts");
            return self.clone();
        }

        let fresh: Vec<Arc<PartDefinition>> = fresh.into_iter().collect();
        let exports = self.exports.with_parts(&fresh);
        let mut parts = self.parts.clone();
        let mut members = self.members.clone();
        for part in &fresh {
            members.insert(Arc::clone(part));
        }
        parts.extend(fresh.iter().cloned());

        debug!(
            offered,
            added = fresh.len(),
            contracts = exports.contract_count(),
            "added parts to catalog"
        );

        Self {
            parts,
            members,
            exports,
            diagnostics: Arc::clone(&self.diagnostics),
            config: Arc::clone(&self.config),
        }
    }

    /// Add the parts of a discovery result and carry over its errors.
    pub fn with_discovered_parts(&self, discovered: DiscoveredParts) -> Self {
        let DiscoveredParts { parts, errors } = discovered;
        self.with_parts(parts).with_diagnostics(errors)
    }

    /// Merge another catalog's parts and discovery errors into this one.
    pub fn with_catalog(&self, other: &ComposableCatalog) -> Self {
        self.with_parts(other.parts.iter().cloned())
            .with_diagnostics(other.diagnostics.iter().cloned())
    }

    /// Merge several catalogs into this one.
    ///
    /// All incoming parts go through a single batch add.
    pub fn with_catalogs<'a, I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = &'a ComposableCatalog>,
    {
        let others: Vec<&ComposableCatalog> = others.into_iter().collect();
        let parts = others.iter().flat_map(|c| c.parts.iter().cloned());
        let errors = others.iter().flat_map(|c| c.diagnostics.iter().cloned());
        self.with_parts(parts).with_diagnostics(errors)
    }

    fn with_diagnostics(self, errors: impl IntoIterator<Item = PartDiscoveryError>) -> Self {
        let mut errors = errors.into_iter().peekable();
        if errors.peek().is_none() {
            return self;
        }

        let mut diagnostics = (*self.diagnostics).clone();
        diagnostics.extend(errors);
        Self {
            diagnostics: Arc::new(diagnostics),
            ..self
        }
    }

    /// Distinct modules referenced by any part's type, exports, or imports.
    ///
    /// Hosts use this to decide when a cached catalog is stale.
    pub fn input_modules(&self) -> HashSet<ModuleId> {
        let mut modules = HashSet::new();
        for part in self.parts.iter() {
            part.collect_input_modules(&mut modules);
        }
        modules
    }

    /// Distinct modules defining the part types, in part order.
    pub fn modules(&self) -> Vec<ModuleId> {
        let modules: IndexSet<&ModuleId> = self
            .parts
            .iter()
            .filter_map(|part| part.part_type.module())
            .collect();
        modules.into_iter().cloned().collect()
    }

    /// Find the exports that satisfy `import`.
    ///
    /// Direct matches on the import's contract name come first, in
    /// registration order. If the import targets a closed generic contract,
    /// the open contract's bindings are closed over the import's type
    /// arguments and follow. Both groups are then filtered by the import's
    /// constraints. No match yields an empty list.
    #[instrument(skip_all, fields(contract = %import.contract_name))]
    pub fn get_exports(
        &self,
        import: &ImportDefinition,
    ) -> Result<Vec<ExportDefinitionBinding>, Error> {
        let satisfies = |binding: &ExportDefinitionBinding| {
            ExportConstraint::all_satisfied_by(&import.export_constraints, &binding.export)
        };

        let mut matches: Vec<ExportDefinitionBinding> = self
            .exports
            .get(&import.contract_name)
            .iter()
            .filter(|&b| satisfies(b))
            .cloned()
            .collect();
        let direct = matches.len();

        let target = if self.config.resolve_open_generics {
            OpenGenericTarget::from_import(import, &self.config.generic_keys)
        } else {
            None
        };

        if let Some(target) = target {
            for open in self.exports.get(&target.contract_name) {
                let closed = open.close_generic(&target.type_arguments)?;
                if satisfies(&closed) {
                    matches.push(closed);
                }
            }
            trace!(
                open_contract = %target.contract_name,
                synthesized = matches.len() - direct,
                "closed open-generic exports"
            );
        }

        trace!(direct, total = matches.len(), "resolved exports");
        Ok(matches)
    }
}

fn part_hash(part: &PartDefinition) -> u64 {
    let mut hasher = DefaultHasher::new();
    part.hash(&mut hasher);
    hasher.finish()
}

impl PartialEq for ComposableCatalog {
    fn eq(&self, other: &Self) -> bool {
        if self.members.ptr_eq(&other.members) {
            return true;
        }
        self.members.len() == other.members.len()
            && self.members.iter().all(|part| other.members.contains(part))
    }
}

impl Eq for ComposableCatalog {}

impl Hash for ComposableCatalog {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self
            .members
            .iter()
            .fold(self.members.len() as u64, |acc, part| acc.wrapping_add(part_hash(part)));
        state.write_u64(combined);
    }
}

impl fmt::Display for ComposableCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = IndentWriter::new(f, self.config.indent_width);
        w.indented(|w| {
            for part in self.parts.iter() {
                w.line(format_args!("Part"))?;
                w.indented(|w| part.describe(w))?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        keys, ExportDefinition, ImportDefinitionBinding, MemberRef, MetadataValue, TypeRef,
    };

    fn app() -> ModuleId {
        ModuleId::new("App")
    }

    fn ty(name: &str) -> TypeRef {
        TypeRef::named(app(), name)
    }

    fn int() -> TypeRef {
        TypeRef::named(ModuleId::new("System.Runtime"), "System.Int32")
    }

    fn exporter(name: &str, contracts: &[&str]) -> PartDefinition {
        contracts.iter().fold(PartDefinition::new(ty(name)), |part, contract| {
            part.with_export(ExportDefinition::new(*contract, ty(contract)))
        })
    }

    fn owners<'a>(bindings: impl IntoIterator<Item = &'a ExportDefinitionBinding>) -> Vec<String> {
        bindings
            .into_iter()
            .map(|b| b.part.part_type.identity())
            .collect()
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ComposableCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.input_modules().is_empty());
        assert!(catalog
            .get_exports(&ImportDefinition::many("Foo"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_with_part_is_persistent() {
        let empty = ComposableCatalog::new();
        let one = empty.with_part(exporter("A", &["Foo"]));
        let two = one.with_part(exporter("B", &["Foo"]));

        assert_eq!(empty.part_count(), 0);
        assert_eq!(one.part_count(), 1);
        assert_eq!(two.part_count(), 2);
        assert_eq!(owners(one.exports_for_contract("Foo")), ["A"]);
        assert_eq!(owners(two.exports_for_contract("Foo")), ["A", "B"]);
    }

    #[test]
    fn test_duplicate_part_is_noop() {
        let catalog = ComposableCatalog::new().with_part(exporter("A", &["Foo"]));
        let again = catalog.with_part(exporter("A", &["Foo"]));

        assert!(again.ptr_eq(&catalog));
        assert_eq!(again, catalog);

        let batch_again = catalog.with_parts([exporter("A", &["Foo"])]);
        assert!(batch_again.ptr_eq(&catalog));
    }

    #[test]
    fn test_add_shares_untouched_storage() {
        let contracts: Vec<String> = (0..20).map(|c| format!("Contract{c}")).collect();
        let names: Vec<&str> = contracts.iter().map(String::as_str).collect();
        let base = ComposableCatalog::from_parts((0..100).map(|i| exporter(&format!("Old{i}"), &names)));

        let next = base.with_part(exporter("New", &["Contract0"]));

        assert_eq!(base.part_count(), 100);
        assert_eq!(next.part_count(), 101);
        assert!(!next.ptr_eq(&base));
        for contract in &names[1..] {
            assert!(base
                .exports_for_contract(contract)
                .ptr_eq(next.exports_for_contract(contract)));
        }
        assert_eq!(next.exports_for_contract("Contract0").len(), 101);
    }

    #[test]
    fn test_batch_deduplicates_within_batch() {
        let catalog = ComposableCatalog::new().with_parts([
            exporter("A", &["Foo"]),
            exporter("A", &["Foo"]),
            exporter("B", &["Foo"]),
        ]);

        assert_eq!(catalog.part_count(), 2);
        assert_eq!(owners(catalog.exports_for_contract("Foo")), ["A", "B"]);
    }

    #[test]
    fn test_equality_ignores_order_and_diagnostics() {
        let ab = ComposableCatalog::new()
            .with_part(exporter("A", &["Foo"]))
            .with_part(exporter("B", &["Bar"]));
        let ba = ComposableCatalog::new()
            .with_part(exporter("B", &["Bar"]))
            .with_part(exporter("A", &["Foo"]))
            .with_discovered_parts(DiscoveredParts::new(
                [],
                [PartDiscoveryError::new("ignored")],
            ));

        assert_eq!(ab, ba);
        assert_eq!(part_hash_of(&ab), part_hash_of(&ba));
        assert_ne!(ab, ComposableCatalog::new().with_part(exporter("A", &["Foo"])));
    }

    fn part_hash_of(catalog: &ComposableCatalog) -> u64 {
        let mut hasher = DefaultHasher::new();
        catalog.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_direct_matches() {
        let catalog = ComposableCatalog::new()
            .with_part(exporter("A", &["Foo"]))
            .with_part(exporter("B", &["Foo", "Bar"]));

        let foo = catalog.get_exports(&ImportDefinition::many("Foo")).unwrap();
        assert_eq!(owners(&foo), ["A", "B"]);

        let bar = catalog.get_exports(&ImportDefinition::many("Bar")).unwrap();
        assert_eq!(owners(&bar), ["B"]);

        let baz = catalog.get_exports(&ImportDefinition::many("Baz")).unwrap();
        assert!(baz.is_empty());
    }

    #[test]
    fn test_constraint_filtering() {
        let fast = PartDefinition::new(ty("Fast"))
            .with_export(ExportDefinition::new("Foo", ty("Foo")).with_metadata("Speed", "fast"));
        let slow = PartDefinition::new(ty("Slow"))
            .with_export(ExportDefinition::new("Foo", ty("Foo")).with_metadata("Speed", "slow"));
        let catalog = ComposableCatalog::from_parts([fast, slow]);

        let import = ImportDefinition::exactly_one("Foo")
            .with_constraint(ExportConstraint::metadata_equals("Speed", "fast"));
        let found = catalog.get_exports(&import).unwrap();
        assert_eq!(owners(&found), ["Fast"]);
    }

    fn open_handler_part(name: &str) -> PartDefinition {
        let definition = TypeRef::generic_definition(app(), "App.IHandler`1", 1);
        PartDefinition::new(TypeRef::generic_definition(app(), name, 1))
            .with_export(ExportDefinition::new("App.IHandler({0})", definition))
    }

    #[test]
    fn test_generic_closure() {
        let catalog = ComposableCatalog::new().with_part(open_handler_part("App.Handler`1"));
        let import = ImportDefinition::exactly_one("App.IHandler(System.Int32)")
            .for_closed_generic("App.IHandler({0})", [int()]);

        let found = catalog.get_exports(&import).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].export.contract_type,
            TypeRef::generic(app(), "App.IHandler`1", [int()])
        );
        assert_eq!(found[0].export.contract_name, "App.IHandler(System.Int32)");

        let open = &catalog.exports_for_contract("App.IHandler({0})")[0];
        assert_ne!(found[0].export, open.export);
        assert!(Arc::ptr_eq(&found[0].part, &open.part));
    }

    #[test]
    fn test_direct_matches_precede_synthesized() {
        let closed = PartDefinition::new(ty("App.IntHandler")).with_export(ExportDefinition::new(
            "App.IHandler(System.Int32)",
            TypeRef::generic(app(), "App.IHandler`1", [int()]),
        ));
        let catalog = ComposableCatalog::new()
            .with_part(open_handler_part("App.Handler`1"))
            .with_part(closed);
        let import = ImportDefinition::many("App.IHandler(System.Int32)")
            .for_closed_generic("App.IHandler({0})", [int()]);

        let found = catalog.get_exports(&import).unwrap();
        assert_eq!(owners(&found), ["App.IntHandler", "App.Handler({0})"]);
    }

    #[test]
    fn test_generic_resolution_can_be_disabled() {
        let catalog = ComposableCatalog::new()
            .with_part(open_handler_part("App.Handler`1"))
            .with_config(CatalogConfig::direct_matches_only());
        let import = ImportDefinition::exactly_one("App.IHandler(System.Int32)")
            .for_closed_generic("App.IHandler({0})", [int()]);

        assert!(catalog.get_exports(&import).unwrap().is_empty());
    }

    #[test]
    fn test_generic_arity_mismatch() {
        let catalog = ComposableCatalog::new().with_part(open_handler_part("App.Handler`1"));
        let import = ImportDefinition::exactly_one("App.IHandler(System.Int32,System.Int32)")
            .for_closed_generic("App.IHandler({0})", [int(), int()]);

        assert!(matches!(
            catalog.get_exports(&import),
            Err(Error::ArityMismatch { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_malformed_generic_metadata_keeps_direct_matches() {
        let catalog = ComposableCatalog::new()
            .with_part(exporter("A", &["Foo"]))
            .with_part(open_handler_part("App.Handler`1"));

        let arguments_as_string = ImportDefinition::exactly_one("Foo")
            .with_metadata(keys::GENERIC_CONTRACT_NAME, "App.IHandler({0})")
            .with_metadata(keys::GENERIC_PARAMETERS, "System.Int32");
        let found = catalog.get_exports(&arguments_as_string).unwrap();
        assert_eq!(owners(&found), ["A"]);

        let name_as_int = ImportDefinition::exactly_one("Foo")
            .with_metadata(keys::GENERIC_CONTRACT_NAME, 7i64)
            .with_metadata(keys::GENERIC_PARAMETERS, MetadataValue::types([int()]));
        let found = catalog.get_exports(&name_as_int).unwrap();
        assert_eq!(owners(&found), ["A"]);
    }

    #[test]
    fn test_with_catalog_unions_parts_and_errors() {
        let left = ComposableCatalog::from_discovered(DiscoveredParts::new(
            [exporter("A", &["Foo"]), exporter("B", &["Foo"])],
            [PartDiscoveryError::new("left")],
        ));
        let right = ComposableCatalog::from_discovered(DiscoveredParts::new(
            [exporter("B", &["Foo"]), exporter("C", &["Bar"])],
            [PartDiscoveryError::new("right")],
        ));

        let merged = left.with_catalog(&right);
        assert_eq!(merged.part_count(), 3);
        assert_eq!(owners(merged.exports_for_contract("Foo")), ["A", "B"]);
        assert_eq!(merged.discovery_errors().len(), 2);
        assert!(matches!(
            merged.ensure_no_discovery_errors(),
            Err(Error::Discovery(errors)) if errors.len() == 2
        ));
    }

    #[test]
    fn test_with_catalogs_matches_repeated_with_catalog() {
        let a = ComposableCatalog::from_parts([exporter("A", &["Foo"])]);
        let b = ComposableCatalog::from_parts([exporter("B", &["Foo"])]);
        let c = ComposableCatalog::from_parts([exporter("C", &["Foo"]), exporter("A", &["Foo"])]);

        let batched = ComposableCatalog::new().with_catalogs([&a, &b, &c]);
        let chained = ComposableCatalog::new()
            .with_catalog(&a)
            .with_catalog(&b)
            .with_catalog(&c);

        assert_eq!(batched, chained);
        assert_eq!(
            owners(batched.exports_for_contract("Foo")),
            owners(chained.exports_for_contract("Foo"))
        );
    }

    #[test]
    fn test_input_modules_deduplicate_by_value() {
        let lib = ModuleId::new("Lib").with_version("2.0");
        let owner = ty("App.Service");
        let service = PartDefinition::new(owner.clone())
            .with_member_export(
                MemberRef::property(owner.clone(), "Clock"),
                ExportDefinition::of_type(TypeRef::named(lib.clone(), "Lib.IClock")),
            )
            .with_import(ImportDefinitionBinding::constructor(
                ImportDefinition::exactly_one("Lib.ITimer"),
                TypeRef::named(ModuleId::new("Lib").with_version("2.0"), "Lib.ITimer"),
            ));
        let catalog = ComposableCatalog::from_parts([service, exporter("Other", &["Foo"])]);

        assert_eq!(catalog.input_modules(), HashSet::from([app(), lib]));
        assert_eq!(catalog.modules(), vec![app()]);
    }

    #[test]
    fn test_display_lists_parts() {
        let catalog = ComposableCatalog::new()
            .with_part(exporter("A", &["Foo"]))
            .with_config(CatalogConfig::new().indent_width(2));

        let dump = catalog.to_string();
        assert!(dump.starts_with("  Part\n    Type: A\n"));
        assert!(dump.contains("      Foo : Foo\n"));
    }
}
