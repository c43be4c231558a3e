//! Scheduled maintenance jobs that talk to the CRM over its GraphQL endpoint.
//!
//! Both jobs are stateless and never raise: every failure is folded into the
//! text appended to their log file.

pub mod client;
pub mod error;
pub mod heartbeat;
pub mod log_file;
pub mod restock;

pub use client::{GraphqlClient, GraphqlReply};
pub use error::JobError;
pub use heartbeat::{probe, run_heartbeat, ProbeStatus, HEARTBEAT_TIMEOUT};
pub use restock::{
    request_restock, run_restock, RestockOutcome, RestockResult, RestockedProduct,
    RESTOCK_TIMEOUT,
};
