use std::path::Path;

use chrono::{DateTime, TimeZone};
use tokio::io::AsyncWriteExt;

use crate::error::JobError;

/// Timestamp prefix used by both job logs, e.g. `16/10/2026-14:05:00`.
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%m/%Y-%H:%M:%S";

#[must_use]
pub fn log_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(LOG_TIMESTAMP_FORMAT).to_string()
}

/// Appends `entry` plus a trailing newline, creating the file if needed.
///
/// # Errors
///
/// Returns [`JobError::Io`] if the file cannot be opened or written.
pub async fn append_entry(path: &Path, entry: &str) -> Result<(), JobError> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    let mut buf = String::with_capacity(entry.len() + 1);
    buf.push_str(entry);
    buf.push('\n');
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
