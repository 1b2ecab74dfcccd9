//! Background job scheduler.
//!
//! Registers the nightly full-catalog sync when Shopify credentials are
//! configured. The returned [`JobScheduler`] handle must be kept alive for
//! the lifetime of the process — dropping it shuts down all jobs.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use vitrine_core::ShopifyConfig;

/// Builds and starts the background job scheduler.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    shopify: Option<ShopifyConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match shopify {
        Some(config) => register_sync_job(&scheduler, pool, config).await?,
        None => {
            tracing::info!("scheduler: Shopify credentials not configured; nightly sync disabled");
        }
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the nightly full-catalog sync, daily at 03:00 UTC.
///
/// A failed pass is logged with its partial count and retried at the next
/// tick; the upsert is idempotent per external id, so re-running is safe.
async fn register_sync_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: ShopifyConfig,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let config = Arc::new(config);

    let job = Job::new_async("0 0 3 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting nightly catalog sync");
            run_sync_job(&pool, &config).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_sync_job(pool: &PgPool, config: &ShopifyConfig) {
    let client = match vitrine_shopify::ShopifyClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build sync client");
            return;
        }
    };

    match vitrine_shopify::sync_products(pool, &client, None).await {
        Ok(report) => {
            tracing::info!(synced = report.synced, "scheduler: nightly catalog sync complete");
        }
        Err(e) => {
            tracing::error!(
                synced = e.synced(),
                error = %e,
                "scheduler: nightly catalog sync aborted; will retry at next tick"
            );
        }
    }
}
