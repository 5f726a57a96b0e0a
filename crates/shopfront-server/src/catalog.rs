//! Catalog resolution: serve from the persistent store when it answers,
//! fall back to the in-memory sample catalog when it does not.
//!
//! Policy: a store call that fails, times out, or returns *no rows at all*
//! for a list is answered from the fallback catalog. Store-connectivity
//! problems are absorbed here and never surface to callers as request
//! failures; only "not found" crosses the boundary.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use shopfront_core::{CatalogHealth, CatalogSource, FallbackCatalog, Product};
use shopfront_db::DbError;

/// Shared store-reachability flag, updated on every store attempt (requests,
/// health probes, the scheduler). Transitions are logged once, not per call.
#[derive(Debug)]
pub struct StoreStatus {
    connected: AtomicBool,
}

impl StoreStatus {
    #[must_use]
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    pub fn record(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::Relaxed);
        if was == connected {
            return;
        }
        if connected {
            tracing::info!("store reachable; catalog serving from store");
        } else {
            tracing::warn!("store unreachable; catalog serving from fallback");
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

/// Why a store attempt produced no usable answer.
#[derive(Debug)]
pub(crate) enum StoreError {
    Query(DbError),
    TimedOut,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Query(e) => write!(f, "store query failed: {e}"),
            StoreError::TimedOut => write!(f, "store attempt timed out"),
        }
    }
}

/// Per-request decision point between the store adapter and the fallback
/// catalog. Cheap to clone; the fallback set is shared and immutable.
#[derive(Clone)]
pub struct CatalogResolver {
    pool: PgPool,
    fallback: Arc<FallbackCatalog>,
    store_timeout: Duration,
    status: Arc<StoreStatus>,
}

impl CatalogResolver {
    #[must_use]
    pub fn new(
        pool: PgPool,
        fallback: Arc<FallbackCatalog>,
        store_timeout: Duration,
        status: Arc<StoreStatus>,
    ) -> Self {
        Self {
            pool,
            fallback,
            store_timeout,
            status,
        }
    }

    /// List products, substituting the fallback catalog when the store
    /// fails, times out, or has no rows. Never fails.
    pub async fn list_products(&self, active_only: bool) -> (Vec<Product>, CatalogSource) {
        let attempt = self
            .store_attempt(shopfront_db::list_products(&self.pool, active_only))
            .await;
        resolve_list(attempt, &self.fallback, active_only)
    }

    /// Look one product up: the store answer wins when present; the fallback
    /// is consulted on store failure *and* on a store miss, so the sample
    /// catalog stays browsable against an empty store. `None` means the
    /// identifier exists in neither source.
    pub async fn get_product(&self, id: &str) -> Option<(Product, CatalogSource)> {
        let attempt = self
            .store_attempt(shopfront_db::get_product(&self.pool, id))
            .await;
        resolve_detail(attempt, &self.fallback, id)
    }

    /// On-demand reachability probe. `available: false` downgrades the
    /// reported source to `fallback`; it is never an error.
    pub async fn health(&self) -> CatalogHealth {
        let attempt = self.store_attempt(shopfront_db::health_check(&self.pool)).await;
        let available = attempt.is_ok();
        CatalogHealth {
            available,
            source: if available {
                CatalogSource::Store
            } else {
                CatalogSource::Fallback
            },
        }
    }

    /// Run one bounded store attempt and record the outcome. At most one
    /// attempt per request; a timed-out future is dropped, never retried,
    /// and never delays the fallback answer.
    async fn store_attempt<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        let outcome = match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Query(e)),
            Err(_) => Err(StoreError::TimedOut),
        };
        self.status.record(outcome.is_ok());
        outcome
    }
}

/// Decide a list answer. Pure so the fallback policy is testable without a
/// database: errors and empty store results are both fallback triggers.
fn resolve_list(
    attempt: Result<Vec<Product>, StoreError>,
    fallback: &FallbackCatalog,
    active_only: bool,
) -> (Vec<Product>, CatalogSource) {
    match attempt {
        Ok(products) if !products.is_empty() => (products, CatalogSource::Store),
        Ok(_) => {
            tracing::debug!("store returned no rows; serving fallback catalog");
            (fallback.products(active_only), CatalogSource::Fallback)
        }
        Err(e) => {
            tracing::warn!(error = %e, "store list failed; serving fallback catalog");
            (fallback.products(active_only), CatalogSource::Fallback)
        }
    }
}

/// Decide a detail answer. A store row always wins; otherwise the fallback
/// is searched by identifier equality.
fn resolve_detail(
    attempt: Result<Option<Product>, StoreError>,
    fallback: &FallbackCatalog,
    id: &str,
) -> Option<(Product, CatalogSource)> {
    match attempt {
        Ok(Some(product)) => Some((product, CatalogSource::Store)),
        Ok(None) => fallback
            .get(id)
            .map(|p| (p.clone(), CatalogSource::Fallback)),
        Err(e) => {
            tracing::warn!(error = %e, "store lookup failed; consulting fallback catalog");
            fallback
                .get(id)
                .map(|p| (p.clone(), CatalogSource::Fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use shopfront_core::Category;

    fn product(id: &str, active: bool) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: "desc".to_string(),
            price: Decimal::new(19_99, 2),
            category: Category::Electronics,
            image: "https://example.com/p.jpg".to_string(),
            stock: 10,
            rating: 4.0,
            review_count: 3,
            is_active: active,
        }
    }

    fn fallback() -> FallbackCatalog {
        FallbackCatalog::from_products(vec![product("f-1", true), product("f-2", false)])
            .expect("valid catalog")
    }

    #[test]
    fn resolve_list_passes_store_rows_through_untouched() {
        let store_rows = vec![product("s-1", true)];
        let (products, source) = resolve_list(Ok(store_rows.clone()), &fallback(), true);
        assert_eq!(products, store_rows);
        assert_eq!(source, CatalogSource::Store);
    }

    #[test]
    fn resolve_list_store_error_falls_back() {
        let (products, source) =
            resolve_list(Err(StoreError::Query(DbError::NotFound)), &fallback(), true);
        assert_eq!(source, CatalogSource::Fallback);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "f-1");
    }

    #[test]
    fn resolve_list_timeout_falls_back() {
        let (products, source) = resolve_list(Err(StoreError::TimedOut), &fallback(), false);
        assert_eq!(source, CatalogSource::Fallback);
        assert_eq!(products.len(), 2);
    }

    // Documented policy: an empty-but-successful store list is a fallback
    // trigger, not a legitimate empty result. A store whose rows are all
    // inactive produces an empty active-only answer and lands here too.
    #[test]
    fn resolve_list_empty_store_falls_back() {
        let (products, source) = resolve_list(Ok(vec![]), &fallback(), true);
        assert_eq!(source, CatalogSource::Fallback);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "f-1");
    }

    #[test]
    fn resolve_list_applies_active_filter_to_fallback() {
        let (active, _) = resolve_list(Ok(vec![]), &fallback(), true);
        assert!(active.iter().all(|p| p.is_active));

        let (all, _) = resolve_list(Ok(vec![]), &fallback(), false);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn resolve_detail_store_row_wins() {
        let hit = resolve_detail(Ok(Some(product("s-1", true))), &fallback(), "s-1");
        let (found, source) = hit.expect("present");
        assert_eq!(found.id, "s-1");
        assert_eq!(source, CatalogSource::Store);
    }

    #[test]
    fn resolve_detail_store_miss_consults_fallback() {
        let hit = resolve_detail(Ok(None), &fallback(), "f-1");
        let (found, source) = hit.expect("present");
        assert_eq!(found.id, "f-1");
        assert_eq!(source, CatalogSource::Fallback);
    }

    #[test]
    fn resolve_detail_store_error_consults_fallback() {
        let hit = resolve_detail(
            Err(StoreError::Query(DbError::InvalidRow("bad".to_string()))),
            &fallback(),
            "f-2",
        );
        let (found, source) = hit.expect("present");
        assert_eq!(found.id, "f-2");
        assert_eq!(source, CatalogSource::Fallback);
    }

    #[test]
    fn resolve_detail_absent_from_both_sources_is_none() {
        assert!(resolve_detail(Ok(None), &fallback(), "missing").is_none());
        assert!(resolve_detail(Err(StoreError::TimedOut), &fallback(), "missing").is_none());
    }

    #[test]
    fn store_status_records_transitions() {
        let status = StoreStatus::new(true);
        assert!(status.is_connected());

        status.record(false);
        assert!(!status.is_connected());

        // Repeated identical outcomes are absorbed without a transition.
        status.record(false);
        assert!(!status.is_connected());

        status.record(true);
        assert!(status.is_connected());
    }
}
