//! Saga error types.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single call to a downstream collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection refused, reset, DNS failure and similar.
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The payment collaborator answered `paid: false`.
    #[error("payment declined")]
    Declined,

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Failure injected by an in-memory collaborator.
    #[error("{0}")]
    Injected(String),
}

impl ClientError {
    /// Returns true if a repeated attempt might succeed.
    ///
    /// Client errors (4xx) and declines are final; transport failures,
    /// timeouts and server errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout | ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Declined | ClientError::Decode(_) | ClientError::Injected(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Errors that can occur during saga operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SagaError {
    /// The state store did not accept the order.
    #[error("state store write failed: {0}")]
    Persistence(ClientError),

    /// The payment step did not succeed.
    #[error("payment failed: {0}")]
    Payment(ClientError),

    /// The completion event was not published.
    #[error("event publish failed: {0}")]
    Publish(ClientError),

    /// A step exceeded its deadline.
    #[error("step '{step}' timed out after {after:?}")]
    StepTimeout { step: &'static str, after: Duration },

    /// Configuration could not be turned into a working client.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
