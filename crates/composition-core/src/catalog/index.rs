//! Persistent contract-name index over export bindings.
//!
//! The index maps each contract name to the ordered list of bindings
//! registered under it. Map and lists are persistent `imbl` structures, so a
//! derived index shares every list it did not touch with its source, and
//! readers of an older index are never disturbed by a newer one.

use super::export::ExportDefinitionBinding;
use super::part::PartDefinition;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Bindings registered under one contract name, in registration order.
pub type BindingList = imbl::Vector<ExportDefinitionBinding>;

fn empty_list() -> &'static BindingList {
    static EMPTY: OnceLock<BindingList> = OnceLock::new();
    EMPTY.get_or_init(BindingList::new)
}

/// Ordered bindings per contract name.
#[derive(Debug, Clone, Default)]
pub struct ExportIndex {
    by_contract: imbl::HashMap<String, BindingList>,
}

impl ExportIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings registered under `contract_name`, in registration order.
    pub fn get(&self, contract_name: &str) -> &BindingList {
        self.by_contract
            .get(contract_name)
            .unwrap_or_else(|| empty_list())
    }

    /// Contract names with at least one binding.
    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.by_contract.keys().map(String::as_str)
    }

    /// Number of contract names.
    pub fn contract_count(&self) -> usize {
        self.by_contract.len()
    }

    /// Total number of bindings.
    pub fn binding_count(&self) -> usize {
        self.by_contract.values().map(|list| list.len()).sum()
    }

    /// Whether `other` shares this index's storage.
    pub fn ptr_eq(&self, other: &ExportIndex) -> bool {
        self.by_contract.ptr_eq(&other.by_contract)
    }

    /// Derive an index with one part's bindings appended.
    pub fn with_part(&self, part: &Arc<PartDefinition>) -> ExportIndex {
        self.with_parts(std::slice::from_ref(part))
    }

    /// Derive an index with every part's bindings appended, in order.
    ///
    /// Bindings are grouped by contract first, so each touched list is
    /// extended once per call. Only the map nodes and list chunks on the
    /// path to the appended bindings are copied. Callers must not pass
    /// parts already indexed.
    pub fn with_parts(&self, parts: &[Arc<PartDefinition>]) -> ExportIndex {
        let mut groups: HashMap<String, Vec<ExportDefinitionBinding>> = HashMap::new();
        for part in parts {
            for binding in part.export_bindings() {
                match groups.get_mut(binding.export.contract_name.as_str()) {
                    Some(group) => group.push(binding),
                    None => {
                        groups.insert(binding.export.contract_name.clone(), vec![binding]);
                    }
                }
            }
        }

        if groups.is_empty() {
            return self.clone();
        }

        let mut by_contract = self.by_contract.clone();
        for (contract, group) in groups {
            match by_contract.get_mut(&contract) {
                Some(list) => list.extend(group),
                None => {
                    by_contract.insert(contract, group.into_iter().collect());
                }
            }
        }

        ExportIndex { by_contract }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ExportDefinition, MemberRef, ModuleId, TypeRef};

    fn ty(name: &str) -> TypeRef {
        TypeRef::named(ModuleId::new("App"), name)
    }

    fn exporter(name: &str, contracts: &[&str]) -> Arc<PartDefinition> {
        let mut part = PartDefinition::new(ty(name));
        for contract in contracts {
            part = part.with_export(ExportDefinition::new(*contract, ty(contract)));
        }
        Arc::new(part)
    }

    fn owners(index: &ExportIndex, contract: &str) -> Vec<String> {
        index
            .get(contract)
            .iter()
            .map(|b| b.part.part_type.identity())
            .collect()
    }

    #[test]
    fn test_empty_lookup() {
        let index = ExportIndex::new();
        assert!(index.get("Foo").is_empty());
        assert_eq!(index.contract_count(), 0);
    }

    #[test]
    fn test_with_part_appends_in_order() {
        let a = exporter("A", &["Foo"]);
        let b = exporter("B", &["Foo", "Bar"]);
        let index = ExportIndex::new().with_part(&a).with_part(&b);

        assert_eq!(owners(&index, "Foo"), ["A", "B"]);
        assert_eq!(owners(&index, "Bar"), ["B"]);
        assert_eq!(index.binding_count(), 3);
    }

    #[test]
    fn test_member_exports_follow_type_exports() {
        let owner = ty("C");
        let part = Arc::new(
            PartDefinition::new(owner.clone())
                .with_member_export(
                    MemberRef::property(owner.clone(), "Value"),
                    ExportDefinition::new("Foo", ty("Foo")),
                )
                .with_export(ExportDefinition::new("Foo", ty("Foo"))),
        );
        let index = ExportIndex::new().with_part(&part);

        let bindings = index.get("Foo");
        assert_eq!(bindings.len(), 2);
        assert!(bindings[0].member.is_none());
        assert_eq!(bindings[1].member.as_ref().unwrap().name, "Value");
    }

    #[test]
    fn test_part_without_exports_shares_storage() {
        let base = ExportIndex::new().with_part(&exporter("A", &["Foo"]));
        let next = base.with_part(&exporter("Silent", &[]));
        assert!(base.ptr_eq(&next));
    }

    #[test]
    fn test_single_add_shares_untouched_contracts() {
        let contracts: Vec<String> = (0..50).map(|c| format!("Contract{c}")).collect();
        let parts: Vec<_> = (0..200)
            .map(|i| {
                let names: Vec<&str> = contracts.iter().map(String::as_str).collect();
                exporter(&format!("Old{i}"), &names)
            })
            .collect();
        let base = ExportIndex::new().with_parts(&parts);

        let next = base.with_part(&exporter("New", &["Contract0"]));

        assert_eq!(next.get("Contract0").len(), 201);
        assert_eq!(base.get("Contract0").len(), 200);
        assert!(!base.get("Contract0").ptr_eq(next.get("Contract0")));
        for contract in &contracts[1..] {
            assert!(base.get(contract).ptr_eq(next.get(contract)), "{contract} was copied");
        }
    }

    #[test]
    fn test_batch_matches_fold() {
        let existing: Vec<_> = (0..100).map(|i| exporter(&format!("Old{i}"), &["Foo"])).collect();
        let base = ExportIndex::new().with_parts(&existing);
        let incoming: Vec<_> = (0..50)
            .map(|i| exporter(&format!("New{i}"), &["Foo", "Bar"]))
            .collect();

        let batched = base.with_parts(&incoming);
        let folded = incoming.iter().fold(base.clone(), |index, part| index.with_part(part));

        assert_eq!(owners(&batched, "Foo"), owners(&folded, "Foo"));
        assert_eq!(owners(&batched, "Bar"), owners(&folded, "Bar"));
        assert_eq!(batched.binding_count(), 200);
        assert_eq!(base.binding_count(), 100);
    }
}
