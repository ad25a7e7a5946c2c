use std::time::Duration;
use thiserror::Error;

/// Failure to obtain transaction records from the ledger
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("HTTP error ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("Rate limited by RPC endpoint (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Ledger call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure to hand a message to the chat service
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Chat API error: {0}")]
    Api(String),
    #[error("Refusing to send an empty message")]
    EmptyMessage,
}

/// Missing or unusable startup configuration. Always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
