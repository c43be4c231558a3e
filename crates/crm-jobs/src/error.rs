use thiserror::Error;

/// Errors raised inside a job before they are folded into its log entry.
#[derive(Debug, Error)]
pub enum JobError {
    /// Network, timeout, or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured endpoint is not a usable URL.
    #[error("invalid GraphQL endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response for {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The log file could not be opened or written.
    #[error("log write failed: {0}")]
    Io(#[from] std::io::Error),
}
