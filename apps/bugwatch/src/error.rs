//! Error types for the report and notifier pipelines.
//!
//! Every failure aborts the current run; nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Search endpoint did not return a usable result.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query '{query}' failed with HTTP status {status}")]
    Status { query: String, status: u16 },
    #[error("query '{query}' failed: {reason}")]
    Transport { query: String, reason: String },
    #[error("query '{query}' returned an unexpected body: {reason}")]
    Decode { query: String, reason: String },
}

/// Persisted seen-set could not be read or written. A missing file is not an error.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write state file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Mail could not be built or handed to the relay.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("mail relay rejected or unreachable: {0}")]
    Relay(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("{0}")]
    Invalid(String),
}

impl Error {
    /// Process exit code: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let query: Error = QueryError::Status {
            query: "q".into(),
            status: 500,
        }
        .into();
        assert_eq!(query.exit_code(), 1);
        let config: Error = ConfigError::Invalid("bad".into()).into();
        assert_eq!(config.exit_code(), 2);
    }
}
