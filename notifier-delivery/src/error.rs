//! Typed error handling for delivery operations.
//!
//! Provider responses and transport failures are sorted into:
//! - Permanent failures: the recipient was rejected, retrying is futile
//! - Temporary failures: anything else, retried with backoff

use thiserror::Error;

/// Failure classification for a single delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Permanent failure that should not be retried.
    #[error("Permanent failure: {0}")]
    Permanent(#[from] PermanentError),

    /// Temporary failure that is retried with backoff.
    #[error("Temporary failure: {0}")]
    Temporary(#[from] TemporaryError),
}

/// Errors that end a delivery sequence.
#[derive(Debug, Error)]
pub enum PermanentError {
    /// The provider reported the recipient address as invalid.
    #[error("Invalid recipient: {status} {body}")]
    InvalidRecipient { status: u16, body: String },
}

/// Errors that are retried with exponential backoff.
#[derive(Debug, Error)]
pub enum TemporaryError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The provider answered with something other than acceptance.
    #[error("Unexpected status: {status} {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Failures of the outbound request itself.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish a connection to the provider.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request or the response body timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other request failure (building, sending or reading the response).
    #[error("Request failed: {0}")]
    Request(String),
}

/// Sort `reqwest` failures by what went wrong. Every variant is retryable.
impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionFailed(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}
