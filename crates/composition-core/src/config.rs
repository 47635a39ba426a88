//! Catalog configuration.

use crate::catalog::keys;

/// Metadata keys that mark an import as targeting a closed generic contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericMetadataKeys {
    /// Key holding the open-generic contract name.
    pub contract_name: String,
    /// Key holding the ordered type arguments.
    pub type_arguments: String,
}

impl Default for GenericMetadataKeys {
    fn default() -> Self {
        Self {
            contract_name: keys::GENERIC_CONTRACT_NAME.to_string(),
            type_arguments: keys::GENERIC_PARAMETERS.to_string(),
        }
    }
}

/// Configuration for export resolution and diagnostics.
///
/// Configuration never takes part in catalog equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Synthesize closed bindings from open-generic exports.
    pub resolve_open_generics: bool,

    /// Reserved import metadata keys for generic resolution.
    pub generic_keys: GenericMetadataKeys,

    /// Spaces per indentation level in the text dump.
    pub indent_width: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            resolve_open_generics: true,
            generic_keys: GenericMetadataKeys::default(),
            indent_width: 4,
        }
    }
}

impl CatalogConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that only ever returns direct contract matches.
    pub fn direct_matches_only() -> Self {
        Self {
            resolve_open_generics: false,
            ..Default::default()
        }
    }

    /// Set whether open-generic exports are closed at query time.
    pub fn resolve_open_generics(mut self, enabled: bool) -> Self {
        self.resolve_open_generics = enabled;
        self
    }

    /// Set the reserved generic metadata keys.
    pub fn generic_keys(
        mut self,
        contract_name: impl Into<String>,
        type_arguments: impl Into<String>,
    ) -> Self {
        self.generic_keys = GenericMetadataKeys {
            contract_name: contract_name.into(),
            type_arguments: type_arguments.into(),
        };
        self
    }

    /// Set the dump indentation width.
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert!(config.resolve_open_generics);
        assert_eq!(config.generic_keys.contract_name, keys::GENERIC_CONTRACT_NAME);
        assert_eq!(config.generic_keys.type_arguments, keys::GENERIC_PARAMETERS);
        assert_eq!(config.indent_width, 4);
    }

    #[test]
    fn test_builder() {
        let config = CatalogConfig::new()
            .resolve_open_generics(false)
            .generic_keys("OpenContract", "TypeArgs")
            .indent_width(2);

        assert!(!config.resolve_open_generics);
        assert_eq!(config.generic_keys.contract_name, "OpenContract");
        assert_eq!(config.indent_width, 2);
        assert!(!CatalogConfig::direct_matches_only().resolve_open_generics);
    }
}
