//! Domain types, validation rules, and configuration shared by every CRM crate.
//!
//! Nothing in this crate performs IO beyond reading environment variables.

pub mod app_config;
pub mod config;
pub mod customers;
pub mod orders;
pub mod products;
pub mod validation;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, JobsConfig, RestockPolicy};
pub use config::{load_app_config, load_app_config_from_env, load_jobs_config};
pub use customers::{BulkRejection, NewCustomer};
pub use orders::{check_resolved_products, order_total, parse_id, NewOrder};
pub use products::NewProduct;
pub use validation::{
    is_valid_phone, validate_phone, validate_price, validate_stock, ValidationError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
