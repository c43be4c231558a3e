//! Low-stock restock job: calls `updateLowStockProducts` and logs the result.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use serde::Deserialize;

use crate::client::GraphqlClient;
use crate::log_file::{append_entry, log_timestamp};

pub const RESTOCK_TIMEOUT: Duration = Duration::from_secs(10);

pub const RESTOCK_MUTATION: &str = r"
mutation {
    updateLowStockProducts {
        message
        updatedProducts {
            id
            name
            stock
        }
    }
}
";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestockedProduct {
    pub id: String,
    pub name: String,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockResult {
    pub message: String,
    pub updated_products: Vec<RestockedProduct>,
}

/// How one restock call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RestockOutcome {
    Updated(RestockResult),
    /// The response carried a GraphQL `errors` array.
    GraphqlErrors(serde_json::Value),
    /// Transport failure, timeout, or an unexpected payload shape.
    RequestError(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<RestockData>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestockData {
    update_low_stock_products: RestockResult,
}

/// Sends the restock mutation once and classifies the reply.
pub async fn request_restock(client: &GraphqlClient) -> RestockOutcome {
    let reply = match client.execute(RESTOCK_MUTATION).await {
        Ok(reply) => reply,
        Err(e) => return RestockOutcome::RequestError(e.to_string()),
    };

    let envelope = match reply.json::<Envelope>("updateLowStockProducts") {
        Ok(envelope) => envelope,
        Err(e) => return RestockOutcome::RequestError(e.to_string()),
    };

    match envelope {
        Envelope {
            errors: Some(errors),
            ..
        } if !errors.is_null() => RestockOutcome::GraphqlErrors(errors),
        Envelope {
            data: Some(data), ..
        } => RestockOutcome::Updated(data.update_low_stock_products),
        Envelope { data: None, .. } => {
            RestockOutcome::RequestError("response has no data".to_string())
        }
    }
}

/// Renders the log block: a header line, then one line per updated product.
#[must_use]
pub fn restock_entry(timestamp: &str, outcome: &RestockOutcome) -> String {
    let mut entry = format!("{timestamp} UpdateLowStockProducts: ");
    match outcome {
        RestockOutcome::Updated(result) => {
            entry.push_str(&result.message);
            for product in &result.updated_products {
                let _ = write!(entry, "\n   - {} → stock: {}", product.name, product.stock);
            }
        }
        RestockOutcome::GraphqlErrors(errors) => {
            let _ = write!(entry, "Failed with errors: {errors}");
        }
        RestockOutcome::RequestError(reason) => {
            let _ = write!(entry, "Request error: {reason}");
        }
    }
    entry
}

/// Runs the restock mutation and appends the result block to `log_path`.
///
/// Returns the block written. Nothing is raised; a write failure is logged.
pub async fn run_restock(client: &GraphqlClient, log_path: &Path) -> String {
    let timestamp = log_timestamp(&Local::now());
    let outcome = request_restock(client).await;

    match &outcome {
        RestockOutcome::Updated(result) => tracing::info!(
            updated = result.updated_products.len(),
            "restock: low-stock products updated"
        ),
        RestockOutcome::GraphqlErrors(errors) => {
            tracing::warn!(%errors, "restock: mutation returned errors");
        }
        RestockOutcome::RequestError(reason) => {
            tracing::warn!(%reason, "restock: request failed");
        }
    }

    let entry = restock_entry(&timestamp, &outcome);
    if let Err(e) = append_entry(log_path, &entry).await {
        tracing::error!(path = %log_path.display(), error = %e, "restock: could not write log");
    }
    entry
}
