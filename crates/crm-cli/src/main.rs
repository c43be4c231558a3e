use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crm_jobs::{GraphqlClient, HEARTBEAT_TIMEOUT, RESTOCK_TIMEOUT};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crm-cli")]
#[command(about = "CRM maintenance command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,
    /// Probe the GraphQL API once and append a heartbeat line.
    Heartbeat(JobArgs),
    /// Run `updateLowStockProducts` once and append the result.
    Restock(JobArgs),
}

#[derive(Debug, clap::Args)]
struct JobArgs {
    /// GraphQL endpoint; overrides `CRM_GRAPHQL_URL`.
    #[arg(long)]
    endpoint: Option<String>,
    /// Log file to append to; overrides the configured path.
    #[arg(long)]
    log_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let default_level = std::env::var("CRM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Migrate => run_migrate().await,
        Commands::Heartbeat(args) => {
            let jobs = crm_core::load_jobs_config()?;
            let (endpoint, log_path) = args.resolve(&jobs.graphql_url, &jobs.heartbeat_log_path);
            let client = GraphqlClient::new(&endpoint, HEARTBEAT_TIMEOUT)?;
            let entry = crm_jobs::run_heartbeat(&client, &log_path).await;
            println!("{entry}");
            Ok(())
        }
        Commands::Restock(args) => {
            let jobs = crm_core::load_jobs_config()?;
            let (endpoint, log_path) = args.resolve(&jobs.graphql_url, &jobs.low_stock_log_path);
            let client = GraphqlClient::new(&endpoint, RESTOCK_TIMEOUT)?;
            let entry = crm_jobs::run_restock(&client, &log_path).await;
            println!("{entry}");
            Ok(())
        }
    }
}

impl JobArgs {
    fn resolve(self, default_endpoint: &str, default_log: &std::path::Path) -> (String, PathBuf) {
        (
            self.endpoint.unwrap_or_else(|| default_endpoint.to_string()),
            self.log_path.unwrap_or_else(|| default_log.to_path_buf()),
        )
    }
}

async fn run_migrate() -> anyhow::Result<()> {
    let config = crm_core::load_app_config()?;
    let pool =
        crm_db::connect_pool(&config.database_url, crm_db::PoolConfig::from_app_config(&config))
            .await?;
    let applied = crm_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    pool.close().await;
    Ok(())
}
