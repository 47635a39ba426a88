//! Part generation for benchmarks.
//!
//! Generators are seeded so every run builds the same catalogs.

use composition_core::{
    ExportConstraint, ExportDefinition, ImportDefinition, ImportDefinitionBinding, MemberRef,
    ModuleId, PartDefinition, TypeRef,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5EED;

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 10 parts over 4 contracts.
    Tiny,
    /// 100 parts over 16 contracts.
    Small,
    /// 2,000 parts over 64 contracts.
    #[default]
    Medium,
    /// 20,000 parts over 256 contracts.
    Large,
}

impl Scale {
    /// Number of parts at this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 10,
            Scale::Small => 100,
            Scale::Medium => 2_000,
            Scale::Large => 20_000,
        }
    }

    /// Number of distinct contracts the parts export.
    pub fn contracts(&self) -> usize {
        match self {
            Scale::Tiny => 4,
            Scale::Small => 16,
            Scale::Medium => 64,
            Scale::Large => 256,
        }
    }
}

fn module(index: usize) -> ModuleId {
    ModuleId::new(format!("Bench.Module{}", index % 8)).with_version("1.0.0.0")
}

/// Contract name for contract number `index`.
pub fn contract_name(index: usize) -> String {
    format!("Bench.IService{index}")
}

/// Generate `count` distinct parts exporting `contracts` contract names.
///
/// Each part exports one to three contracts from its type, may export one
/// more from a property, and imports a contract of its own.
pub fn generate_parts(count: usize, contracts: usize) -> Vec<PartDefinition> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let contracts = contracts.max(1);

    (0..count)
        .map(|i| {
            let part_type = TypeRef::named(module(i), format!("Bench.Service{i}"));
            let mut part = PartDefinition::new(part_type.clone());

            for _ in 0..rng.gen_range(1..=3) {
                let contract = rng.gen_range(0..contracts);
                let export = ExportDefinition::new(
                    contract_name(contract),
                    TypeRef::named(module(contract), contract_name(contract)),
                )
                .with_metadata("Rank", rng.gen_range(0..10i64));
                part = part.with_export(export);
            }

            if rng.gen_bool(0.3) {
                let contract = rng.gen_range(0..contracts);
                part = part.with_member_export(
                    MemberRef::property(part_type.clone(), "Inner"),
                    ExportDefinition::new(
                        contract_name(contract),
                        TypeRef::named(module(contract), contract_name(contract)),
                    ),
                );
            }

            let dependency = rng.gen_range(0..contracts);
            part.with_import(ImportDefinitionBinding::constructor(
                ImportDefinition::exactly_one(contract_name(dependency)),
                TypeRef::named(module(dependency), contract_name(dependency)),
            ))
        })
        .collect()
}

/// Generate `count` parts exporting the open contract `Bench.IHandler({0})`.
pub fn generate_open_generic_parts(count: usize) -> Vec<PartDefinition> {
    let definition = TypeRef::generic_definition(module(0), "Bench.IHandler`1", 1);
    (0..count)
        .map(|i| {
            PartDefinition::new(TypeRef::generic_definition(module(i), format!("Bench.Handler{i}`1"), 1))
                .with_export(ExportDefinition::new("Bench.IHandler({0})", definition.clone()))
        })
        .collect()
}

/// Import of contract number `index` restricted to exports ranked `rank`.
pub fn ranked_import(index: usize, rank: i64) -> ImportDefinition {
    ImportDefinition::many(contract_name(index))
        .with_constraint(ExportConstraint::metadata_equals("Rank", rank))
}
