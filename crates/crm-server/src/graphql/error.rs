use async_graphql::{Error, ErrorExtensions};
use crm_core::ValidationError;
use crm_db::DbError;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Rule violations carry their message to the client as-is.
pub fn validation_error(error: &ValidationError) -> Error {
    Error::new(error.to_string()).extend_with(|_, ext| ext.set("code", VALIDATION_ERROR))
}

/// Hides database detail from the client; the cause goes to the log.
pub fn internal_error(context: &str, detail: &dyn std::fmt::Display) -> Error {
    tracing::error!(error = %detail, context, "graphql: request failed");
    Error::new("Internal server error").extend_with(|_, ext| ext.set("code", INTERNAL_ERROR))
}

pub fn db_error(error: DbError) -> Error {
    match error {
        DbError::Validation(rule) => validation_error(&rule),
        other => internal_error("database", &other),
    }
}
