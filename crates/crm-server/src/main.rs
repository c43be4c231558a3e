mod api;
mod graphql;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(crm_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = crm_db::PoolConfig::from_app_config(&config);
    let pool = crm_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = crm_db::run_migrations(&pool).await?;
    tracing::info!(applied, env = %config.env, "database ready");

    let _scheduler = if config.jobs.scheduler_enabled {
        Some(scheduler::build_scheduler(&config.jobs).await?)
    } else {
        tracing::info!("scheduler disabled; run `crm-cli heartbeat` and `crm-cli restock` externally");
        None
    };

    let schema = graphql::build_schema(pool.clone(), config.restock);
    let app = build_app(AppState { pool, schema });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "crm-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
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
