//! Composition catalog benchmark suite.
//!
//! # Benchmark Categories
//!
//! - **Catalog**: Single and batch part addition, merging, snapshots
//! - **Resolve**: Direct export lookup, constraint filtering, open-generic closure

pub mod fixtures;

pub use fixtures::{
    contract_name, generate_open_generic_parts, generate_parts, ranked_import, Scale,
};
