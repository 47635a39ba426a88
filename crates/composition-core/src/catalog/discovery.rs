//! Output of part discovery, as handed to the catalog.
//!
//! The catalog never inspects discovery errors; it only carries them along
//! so the host can decide whether they are fatal.

use super::part::PartDefinition;
use super::types::TypeRef;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error as ThisError;

/// A failure reported while discovering parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, ThisError, Serialize, Deserialize)]
#[error("{message}")]
pub struct PartDiscoveryError {
    /// Human-readable description.
    pub message: String,
    /// Type being inspected when the failure occurred.
    pub source_type: Option<TypeRef>,
}

impl PartDiscoveryError {
    /// Create a discovery error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source_type: None,
        }
    }

    /// Attach the type that was being inspected.
    pub fn with_source_type(mut self, ty: TypeRef) -> Self {
        self.source_type = Some(ty);
        self
    }
}

/// Parts found by a discovery pass, with any errors it reported.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredParts {
    /// Discovered parts.
    pub parts: Vec<Arc<PartDefinition>>,
    /// Errors reported during discovery.
    pub errors: Vec<PartDiscoveryError>,
}

impl DiscoveredParts {
    /// Create a discovery result.
    pub fn new(
        parts: impl IntoIterator<Item = PartDefinition>,
        errors: impl IntoIterator<Item = PartDiscoveryError>,
    ) -> Self {
        Self {
            parts: parts.into_iter().map(Arc::new).collect(),
            errors: errors.into_iter().collect(),
        }
    }

    /// Combine two discovery results.
    pub fn merge(mut self, other: DiscoveredParts) -> Self {
        self.parts.extend(other.parts);
        self.errors.extend(other.errors);
        self
    }

    /// Whether discovery reported no errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail with [`Error::Discovery`] if any errors were reported.
    pub fn into_result(self) -> Result<Vec<Arc<PartDefinition>>, Error> {
        if self.errors.is_empty() {
            Ok(self.parts)
        } else {
            Err(Error::Discovery(self.errors))
        }
    }
}
