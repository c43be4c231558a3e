use crate::app_config::{AppConfig, Environment, JobsConfig, RestockPolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the job settings (`CRM_GRAPHQL_URL`, log paths, schedules).
///
/// Used by `crm-cli heartbeat` and `crm-cli restock`, which never touch the
/// database and so do not require `DATABASE_URL`. Loads `.env` first.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if `CRM_SCHEDULER_ENABLED` is not a bool.
pub fn load_jobs_config() -> Result<JobsConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_jobs_config(&|key: &str| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CRM_ENV", "development"))?;

    let bind_addr: SocketAddr =
        parse_as("CRM_BIND_ADDR", &or_default("CRM_BIND_ADDR", "0.0.0.0:8000"))?;
    let log_level = or_default("CRM_LOG_LEVEL", "info");

    let db_max_connections: u32 = parse_as(
        "CRM_DB_MAX_CONNECTIONS",
        &or_default("CRM_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "CRM_DB_MIN_CONNECTIONS",
        &or_default("CRM_DB_MIN_CONNECTIONS", "1"),
    )?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "CRM_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs: u64 = parse_as(
        "CRM_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("CRM_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let restock = RestockPolicy {
        threshold: parse_as(
            "CRM_LOW_STOCK_THRESHOLD",
            &or_default("CRM_LOW_STOCK_THRESHOLD", "10"),
        )?,
        amount: parse_as(
            "CRM_RESTOCK_AMOUNT",
            &or_default("CRM_RESTOCK_AMOUNT", "10"),
        )?,
    };
    if restock.amount <= 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CRM_RESTOCK_AMOUNT".to_string(),
            reason: format!("must be positive, got {}", restock.amount),
        });
    }

    let jobs = build_jobs_config(&lookup)?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        restock,
        jobs,
    })
}

fn build_jobs_config<F>(lookup: &F) -> Result<JobsConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    Ok(JobsConfig {
        graphql_url: or_default("CRM_GRAPHQL_URL", "http://localhost:8000/graphql"),
        heartbeat_log_path: PathBuf::from(or_default(
            "CRM_HEARTBEAT_LOG_PATH",
            "/tmp/crm_heartbeat_log.txt",
        )),
        low_stock_log_path: PathBuf::from(or_default(
            "CRM_LOW_STOCK_LOG_PATH",
            "/tmp/low_stock_updates_log.txt",
        )),
        heartbeat_cron: or_default("CRM_HEARTBEAT_CRON", "0 */5 * * * *"),
        low_stock_cron: or_default("CRM_LOW_STOCK_CRON", "0 0 */12 * * *"),
        scheduler_enabled: parse_as(
            "CRM_SCHEDULER_ENABLED",
            &or_default("CRM_SCHEDULER_ENABLED", "true"),
        )?,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CRM_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
