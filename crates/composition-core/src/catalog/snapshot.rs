//! Catalog snapshots for caching catalogs across runs.
//!
//! A snapshot records the parts in insertion order plus discovery errors.
//! The export index is not stored; restoring replays the parts through a
//! single batch add, which reproduces the same index order.

use super::catalog::ComposableCatalog;
use super::discovery::{DiscoveredParts, PartDiscoveryError};
use super::part::PartDefinition;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Current snapshot format version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    parts: Vec<&'a PartDefinition>,
    diagnostics: &'a [PartDiscoveryError],
}

#[derive(Deserialize)]
struct Snapshot {
    format_version: u32,
    parts: Vec<PartDefinition>,
    #[serde(default)]
    diagnostics: Vec<PartDiscoveryError>,
}

impl ComposableCatalog {
    fn snapshot(&self) -> SnapshotRef<'_> {
        SnapshotRef {
            format_version: SNAPSHOT_FORMAT_VERSION,
            parts: self.parts().map(|part| &**part).collect(),
            diagnostics: self.discovery_errors(),
        }
    }

    /// Serialize the catalog's parts and discovery errors to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.snapshot()).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize the catalog to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(&self.snapshot()).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Restore a catalog from [`to_json`](Self::to_json) output.
    ///
    /// The restored catalog uses the default configuration.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))?;
        Self::restore(snapshot)
    }

    /// Restore a catalog from [`to_bytes`](Self::to_bytes) output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let snapshot: Snapshot =
            serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))?;
        Self::restore(snapshot)
    }

    fn restore(snapshot: Snapshot) -> Result<Self, Error> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::Deserialization(format!(
                "unsupported catalog snapshot version {} (expected {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        debug!(
            parts = snapshot.parts.len(),
            errors = snapshot.diagnostics.len(),
            "restoring catalog snapshot"
        );
        Ok(Self::from_discovered(DiscoveredParts {
            parts: snapshot.parts.into_iter().map(Arc::new).collect(),
            errors: snapshot.diagnostics,
        }))
    }
}
