//! Export resolution benchmarks.

use composition_bench::fixtures::{
    contract_name, generate_open_generic_parts, generate_parts, ranked_import, Scale,
};
use composition_core::{CatalogConfig, ComposableCatalog, ImportDefinition, ModuleId, TypeRef};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_direct_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/direct");

    for scale in [Scale::Small, Scale::Medium, Scale::Large] {
        let catalog = ComposableCatalog::from_parts(generate_parts(scale.count(), scale.contracts()));
        let import = ImportDefinition::many(contract_name(0));

        group.bench_with_input(BenchmarkId::new("many", scale.count()), &import, |b, import| {
            b.iter(|| black_box(catalog.get_exports(import).unwrap()));
        });
    }

    group.bench_function("missing_contract", |b| {
        let catalog = ComposableCatalog::from_parts(generate_parts(100, 16));
        let import = ImportDefinition::many("Bench.IMissing");
        b.iter(|| black_box(catalog.get_exports(&import).unwrap()));
    });

    group.finish();
}

fn bench_constraints(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/constraints");

    let scale = Scale::Medium;
    let catalog = ComposableCatalog::from_parts(generate_parts(scale.count(), scale.contracts()));

    group.bench_function("metadata_equals", |b| {
        let import = ranked_import(3, 5);
        b.iter(|| black_box(catalog.get_exports(&import).unwrap()));
    });

    group.finish();
}

fn bench_open_generic(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve/open_generic");

    let int = TypeRef::named(ModuleId::new("System.Runtime"), "System.Int32");
    let import = ImportDefinition::many("Bench.IHandler(System.Int32)")
        .for_closed_generic("Bench.IHandler({0})", [int]);

    for count in [1, 10, 100] {
        let catalog = ComposableCatalog::from_parts(generate_open_generic_parts(count));
        group.bench_with_input(BenchmarkId::new("close", count), &import, |b, import| {
            b.iter(|| black_box(catalog.get_exports(import).unwrap()));
        });
    }

    let disabled = ComposableCatalog::from_parts(generate_open_generic_parts(100))
        .with_config(CatalogConfig::direct_matches_only());
    group.bench_function("disabled", |b| {
        b.iter(|| black_box(disabled.get_exports(&import).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_direct_lookup, bench_constraints, bench_open_generic);
criterion_main!(benches);
