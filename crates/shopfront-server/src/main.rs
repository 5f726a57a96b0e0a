mod api;
mod catalog;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use shopfront_core::FallbackCatalog;

use crate::{
    api::{build_app, AppState, CartStore},
    catalog::{CatalogResolver, StoreStatus},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(shopfront_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = shopfront_db::PoolConfig::from_app_config(&config);
    let pool = shopfront_db::connect_pool_lazy(&config.database_url, pool_config)?;

    let store_timeout = Duration::from_secs(config.store_timeout_secs);

    // Best effort: a down store must never block startup. The catalog keeps
    // serving the fallback set until the store comes up.
    let store_ready =
        match tokio::time::timeout(store_timeout, shopfront_db::run_migrations(&pool)).await {
            Ok(Ok(applied)) => {
                if applied > 0 {
                    tracing::info!(applied, "applied pending store migrations");
                }
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "store unavailable at startup; serving fallback catalog");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = config.store_timeout_secs,
                    "store did not answer at startup; serving fallback catalog"
                );
                false
            }
        };

    let fallback = Arc::new(load_fallback_catalog(&config));
    let status = Arc::new(StoreStatus::new(store_ready));
    let resolver = CatalogResolver::new(
        pool.clone(),
        Arc::clone(&fallback),
        store_timeout,
        Arc::clone(&status),
    );
    tracing::info!(
        store_connected = status.is_connected(),
        fallback_products = fallback.len(),
        "catalog resolver ready"
    );

    let _scheduler = scheduler::build_scheduler(pool, Arc::clone(&status), store_timeout).await?;

    let rate_limit = RateLimitState::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    let app = build_app(
        AppState {
            catalog: resolver,
            carts: CartStore::new(),
        },
        rate_limit,
        &config.cors_origin,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "shopfront server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// The catalog file, when present and valid, overrides the built-in sample
/// set; either way the process always has a fallback catalog.
fn load_fallback_catalog(config: &shopfront_core::AppConfig) -> FallbackCatalog {
    if config.catalog_path.exists() {
        match shopfront_core::load_catalog(&config.catalog_path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %config.catalog_path.display(),
                    products = catalog.len(),
                    "loaded fallback catalog from file"
                );
                return catalog;
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog file invalid; using built-in sample catalog");
            }
        }
    }
    FallbackCatalog::builtin()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
