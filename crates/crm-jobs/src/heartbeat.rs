//! Liveness heartbeat: one log line per run, with the API's probe result.

use std::path::Path;
use std::time::Duration;

use chrono::Local;

use crate::client::GraphqlClient;
use crate::log_file::{append_entry, log_timestamp};

pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);
pub const HELLO_QUERY: &str = "{ hello }";

/// What the `{ hello }` probe observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// 2xx response whose `data` object contains `hello`.
    Responsive,
    /// Non-success status, or a `data` object that is absent or lacks `hello`.
    Failed,
    /// Transport failure, timeout, a body that is not a JSON object, or a
    /// `data` member that is not an object (including `null`).
    Error,
}

impl ProbeStatus {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            ProbeStatus::Responsive => " (GraphQL responsive)",
            ProbeStatus::Failed => " (GraphQL failed)",
            ProbeStatus::Error => " (GraphQL error)",
        }
    }
}

/// Queries `{ hello }` once. Never fails; every outcome maps to a status.
pub async fn probe(client: &GraphqlClient) -> ProbeStatus {
    let reply = match client.execute(HELLO_QUERY).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(endpoint = %client.endpoint(), error = %e, "heartbeat: probe failed");
            return ProbeStatus::Error;
        }
    };

    if !reply.status.is_success() {
        tracing::warn!(status = %reply.status, "heartbeat: probe returned non-success status");
        return ProbeStatus::Failed;
    }

    match reply.json::<serde_json::Value>("hello probe") {
        Ok(body) => classify_body(&body),
        Err(e) => {
            tracing::warn!(error = %e, "heartbeat: probe body was not JSON");
            ProbeStatus::Error
        }
    }
}

/// Maps a 2xx JSON body to a status. A missing `data` counts as an empty
/// object; a `null` one does not.
fn classify_body(body: &serde_json::Value) -> ProbeStatus {
    let Some(body) = body.as_object() else {
        tracing::warn!("heartbeat: probe body was not a JSON object");
        return ProbeStatus::Error;
    };
    match body.get("data") {
        None => ProbeStatus::Failed,
        Some(serde_json::Value::Object(data)) if data.contains_key("hello") => {
            ProbeStatus::Responsive
        }
        Some(serde_json::Value::Object(_)) => ProbeStatus::Failed,
        Some(other) => {
            tracing::warn!(data = %other, "heartbeat: probe data was not an object");
            ProbeStatus::Error
        }
    }
}

#[must_use]
pub fn heartbeat_entry(timestamp: &str, status: ProbeStatus) -> String {
    format!("{timestamp} CRM is alive{}", status.suffix())
}

/// Probes the API and appends one line to `log_path`.
///
/// Returns the line written. A write failure is logged, not raised.
pub async fn run_heartbeat(client: &GraphqlClient, log_path: &Path) -> String {
    let timestamp = log_timestamp(&Local::now());
    let status = probe(client).await;
    let entry = heartbeat_entry(&timestamp, status);

    if let Err(e) = append_entry(log_path, &entry).await {
        tracing::error!(path = %log_path.display(), error = %e, "heartbeat: could not write log");
    } else {
        tracing::debug!(?status, "heartbeat: logged");
    }

    entry
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn body_classification() {
        assert_eq!(
            classify_body(&json!({ "data": { "hello": "hi" } })),
            ProbeStatus::Responsive
        );
        assert_eq!(classify_body(&json!({ "data": {} })), ProbeStatus::Failed);
        assert_eq!(classify_body(&json!({})), ProbeStatus::Failed);
        assert_eq!(classify_body(&json!({ "data": null })), ProbeStatus::Error);
        assert_eq!(classify_body(&json!([1, 2])), ProbeStatus::Error);
    }

    #[test]
    fn entry_appends_probe_suffix() {
        assert_eq!(
            heartbeat_entry("01/02/2026-03:04:05", ProbeStatus::Responsive),
            "01/02/2026-03:04:05 CRM is alive (GraphQL responsive)"
        );
        assert_eq!(
            heartbeat_entry("01/02/2026-03:04:05", ProbeStatus::Failed),
            "01/02/2026-03:04:05 CRM is alive (GraphQL failed)"
        );
        assert_eq!(
            heartbeat_entry("01/02/2026-03:04:05", ProbeStatus::Error),
            "01/02/2026-03:04:05 CRM is alive (GraphQL error)"
        );
    }
}
