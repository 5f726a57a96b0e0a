use thiserror::Error;

pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod pricing;
pub mod product;

pub use app_config::{AppConfig, Environment};
pub use cart::{Cart, CartLine};
pub use catalog::{load_catalog, CatalogHealth, CatalogSource, FallbackCatalog};
pub use config::{load_app_config, load_app_config_from_env};
pub use pricing::{compute_totals, CartTotals};
pub use product::{Category, Product};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read catalog file {path}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file")]
    CatalogFileParse(#[from] serde_yaml::Error),
    #[error("catalog validation failed: {0}")]
    Validation(String),
}
