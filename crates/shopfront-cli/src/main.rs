use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use shopfront_core::FallbackCatalog;

#[derive(Debug, Parser)]
#[command(name = "shopfront-cli")]
#[command(about = "Shopfront operations command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a product catalog file and upsert it into the store.
    Seed {
        /// Catalog YAML to seed from; defaults to the configured catalog
        /// path, falling back to the built-in sample set.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Probe store reachability and report status.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = shopfront_core::load_app_config_from_env()?;

    match cli.command {
        Commands::Seed { file } => seed(&config, file).await,
        Commands::Check => check(&config).await,
    }
}

async fn seed(
    config: &shopfront_core::AppConfig,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let catalog = load_catalog_for_seed(config, file)?;

    let pool_config = shopfront_db::PoolConfig::from_app_config(config);
    let pool = shopfront_db::connect_pool(&config.database_url, pool_config).await?;

    let applied = shopfront_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending store migrations");
    }

    let products = catalog.products(false);
    let count = shopfront_db::seed_products(&pool, &products).await?;
    let total = shopfront_db::count_products(&pool).await?;

    println!("seeded {count} products ({total} now in store)");
    Ok(())
}

fn load_catalog_for_seed(
    config: &shopfront_core::AppConfig,
    file: Option<PathBuf>,
) -> anyhow::Result<FallbackCatalog> {
    if let Some(path) = file {
        let catalog = shopfront_core::load_catalog(&path)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "loaded catalog file");
        return Ok(catalog);
    }

    if config.catalog_path.exists() {
        let catalog = shopfront_core::load_catalog(&config.catalog_path)?;
        tracing::info!(
            path = %config.catalog_path.display(),
            products = catalog.len(),
            "loaded configured catalog file"
        );
        return Ok(catalog);
    }

    tracing::info!("no catalog file found; seeding the built-in sample set");
    Ok(FallbackCatalog::builtin())
}

/// Reachability is status, not error: both outcomes exit zero.
async fn check(config: &shopfront_core::AppConfig) -> anyhow::Result<()> {
    let pool_config = shopfront_db::PoolConfig::from_app_config(config);
    let pool = shopfront_db::connect_pool_lazy(&config.database_url, pool_config)?;

    let timeout = Duration::from_secs(config.store_timeout_secs);
    match tokio::time::timeout(timeout, shopfront_db::health_check(&pool)).await {
        Ok(Ok(())) => println!("store: ok"),
        Ok(Err(e)) => println!("store: unreachable ({e})"),
        Err(_) => println!("store: unreachable (timed out after {}s)", timeout.as_secs()),
    }
    Ok(())
}
