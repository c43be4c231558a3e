//! Background job scheduler.
//!
//! Registers the heartbeat and low-stock restock jobs. Both jobs call the
//! server's own GraphQL endpoint over HTTP, so they behave the same whether
//! run here or from `crm-cli`.

use std::path::PathBuf;
use std::sync::Arc;

use crm_core::JobsConfig;
use crm_jobs::{GraphqlClient, HEARTBEAT_TIMEOUT, RESTOCK_TIMEOUT};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the job scheduler.
///
/// The returned handle must be held for the life of the process; dropping it
/// stops the jobs.
///
/// # Errors
///
/// Fails if the endpoint URL is invalid, a cron expression does not parse,
/// or the scheduler cannot start.
pub async fn build_scheduler(jobs: &JobsConfig) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let heartbeat_client = GraphqlClient::new(&jobs.graphql_url, HEARTBEAT_TIMEOUT)?;
    register_heartbeat_job(
        &scheduler,
        &jobs.heartbeat_cron,
        heartbeat_client,
        jobs.heartbeat_log_path.clone(),
    )
    .await?;

    let restock_client = GraphqlClient::new(&jobs.graphql_url, RESTOCK_TIMEOUT)?;
    register_restock_job(
        &scheduler,
        &jobs.low_stock_cron,
        restock_client,
        jobs.low_stock_log_path.clone(),
    )
    .await?;

    scheduler.start().await?;
    tracing::info!(
        heartbeat = %jobs.heartbeat_cron,
        restock = %jobs.low_stock_cron,
        endpoint = %jobs.graphql_url,
        "scheduler: started"
    );
    Ok(scheduler)
}

async fn register_heartbeat_job(
    scheduler: &JobScheduler,
    cron: &str,
    client: GraphqlClient,
    log_path: PathBuf,
) -> Result<(), JobSchedulerError> {
    let client = Arc::new(client);
    let log_path = Arc::new(log_path);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let client = Arc::clone(&client);
        let log_path = Arc::clone(&log_path);

        Box::pin(async move {
            let entry = crm_jobs::run_heartbeat(&client, &log_path).await;
            tracing::debug!(%entry, "scheduler: heartbeat run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn register_restock_job(
    scheduler: &JobScheduler,
    cron: &str,
    client: GraphqlClient,
    log_path: PathBuf,
) -> Result<(), JobSchedulerError> {
    let client = Arc::new(client);
    let log_path = Arc::new(log_path);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let client = Arc::clone(&client);
        let log_path = Arc::clone(&log_path);

        Box::pin(async move {
            tracing::info!("scheduler: starting low-stock restock run");
            let entry = crm_jobs::run_restock(&client, &log_path).await;
            tracing::info!(%entry, "scheduler: low-stock restock run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
