//! Minimal GraphQL-over-HTTP client used by the scheduled jobs.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::JobError;

/// Posts GraphQL documents to a single endpoint with a fixed timeout.
///
/// No retries: a failed call is reported once and left to the next run.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: Client,
    endpoint: Url,
}

/// Status and raw body of one GraphQL call.
#[derive(Debug, Clone)]
pub struct GraphqlReply {
    pub status: StatusCode,
    body: Vec<u8>,
}

impl GraphqlReply {
    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self, context: &'static str) -> Result<T, JobError> {
        serde_json::from_slice(&self.body).map_err(|source| JobError::Decode { context, source })
    }
}

impl GraphqlClient {
    /// # Errors
    ///
    /// Returns [`JobError::InvalidEndpoint`] if `endpoint` does not parse, or
    /// [`JobError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, JobError> {
        let endpoint = Url::parse(endpoint).map_err(|e| JobError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crm-jobs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends `{"query": document}` and reads the whole response body.
    ///
    /// Non-2xx statuses are returned, not treated as errors; callers decide.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Http`] on connection failure, timeout, or a body
    /// read error.
    pub async fn execute(&self, document: &str) -> Result<GraphqlReply, JobError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "query": document }))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(GraphqlReply { status, body })
    }
}
