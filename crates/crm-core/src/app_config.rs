use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How `updateLowStockProducts` picks and refills products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestockPolicy {
    /// Products with stock strictly below this value are restocked.
    pub threshold: i32,
    /// Units added to each low-stock product.
    pub amount: i32,
}

impl Default for RestockPolicy {
    fn default() -> Self {
        Self {
            threshold: 10,
            amount: 10,
        }
    }
}

/// Settings for the heartbeat and restock jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsConfig {
    pub graphql_url: String,
    pub heartbeat_log_path: PathBuf,
    pub low_stock_log_path: PathBuf,
    pub heartbeat_cron: String,
    pub low_stock_cron: String,
    pub scheduler_enabled: bool,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub restock: RestockPolicy,
    pub jobs: JobsConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("restock", &self.restock)
            .field("jobs", &self.jobs)
            .finish()
    }
}
