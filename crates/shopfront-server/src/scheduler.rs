//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring store-reachability probe.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::catalog::StoreStatus;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    status: Arc<StoreStatus>,
    store_timeout: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_store_probe_job(&scheduler, pool, status, store_timeout).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the minutely store-reachability probe (`0 * * * * *`).
///
/// Each run pings the store under the bounded timeout and records the
/// outcome on the shared [`StoreStatus`]; transitions between reachable and
/// unreachable are logged there exactly once.
async fn register_store_probe_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    status: Arc<StoreStatus>,
    store_timeout: Duration,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let status = Arc::clone(&status);

        Box::pin(async move {
            run_store_probe(&pool, &status, store_timeout).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// One bounded reachability check against the store.
pub(crate) async fn run_store_probe(pool: &PgPool, status: &StoreStatus, store_timeout: Duration) {
    let reachable = matches!(
        tokio::time::timeout(store_timeout, shopfront_db::health_check(pool)).await,
        Ok(Ok(()))
    );
    status.record(reachable);
    tracing::debug!(reachable, "store probe completed");
}
