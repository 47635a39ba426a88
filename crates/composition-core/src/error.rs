//! Core error types.

use thiserror::Error;

use crate::catalog::PartDiscoveryError;

/// Catalog and export-resolution errors.
#[derive(Debug, Error)]
pub enum Error {
    /// An open-generic export was closed over the wrong number of type arguments.
    #[error(
        "cannot close open generic export `{contract}`: it declares {expected} type parameter(s) but {actual} type argument(s) were supplied"
    )]
    ArityMismatch {
        /// Contract name of the open-generic export.
        contract: String,
        /// Arity of the open export's contract type.
        expected: usize,
        /// Number of type arguments supplied by the import.
        actual: usize,
    },

    /// Part discovery reported errors and the caller asked for them to be fatal.
    #[error("part discovery reported {} error(s)", .0.len())]
    Discovery(Vec<PartDiscoveryError>),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}
