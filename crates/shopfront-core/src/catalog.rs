//! The fallback catalog and catalog health reporting types.
//!
//! The fallback catalog is a fixed, always-available product set. It is
//! loaded once at startup (built-in data or a YAML file override) and passed
//! by shared handle to the resolver; it is never reconstructed per call.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::ConfigError;

/// Which source a catalog answer (or the health probe) was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Store,
    Fallback,
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Store => write!(f, "store"),
            CatalogSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// Snapshot of store reachability. Recomputed on every probe; not persisted.
/// `available: false` is a degraded status, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogHealth {
    pub available: bool,
    pub source: CatalogSource,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// Immutable in-memory product set used when the store cannot answer.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    products: Vec<Product>,
}

impl FallbackCatalog {
    /// Build a catalog from raw products, normalizing ratings and rejecting
    /// invalid entries and duplicate identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on the first offending product.
    pub fn from_products(products: Vec<Product>) -> Result<Self, ConfigError> {
        let products: Vec<Product> = products.into_iter().map(Product::normalize).collect();
        validate_products(&products)?;
        Ok(Self { products })
    }

    /// The sample catalog compiled into the binary.
    ///
    /// The embedded data is validated by tests; a parse failure here is a
    /// build defect, not a runtime condition.
    #[must_use]
    pub fn builtin() -> Self {
        let file: CatalogFile =
            serde_yaml::from_str(include_str!("../data/fallback_products.yaml"))
                .expect("built-in catalog data is well-formed");
        Self::from_products(file.products).expect("built-in catalog data is valid")
    }

    /// All products, optionally filtered to active ones. The `active`
    /// predicate is identical to the store path's filter so callers see
    /// consistent behavior regardless of source.
    #[must_use]
    pub fn products(&self, active_only: bool) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect()
    }

    /// Look a product up by identifier equality.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_catalog(path: &Path) -> Result<FallbackCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CatalogFile = serde_yaml::from_str(&content)?;
    FallbackCatalog::from_products(file.products)
}

fn validate_products(products: &[Product]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for product in products {
        product.validate()?;

        if !seen_ids.insert(product.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }
    }

    Ok(())
}
