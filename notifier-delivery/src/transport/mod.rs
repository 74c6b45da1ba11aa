//! Outbound delivery channels.
//!
//! The retry loop only needs a way to hand a [`Message`] to the provider and
//! learn the status it answered with; [`Transport`] is that seam.

mod sendgrid;

use async_trait::async_trait;

pub use sendgrid::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT, SendGridTransport};

use crate::{error::TransportError, message::Message};

/// What the provider answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, as text
    pub body: String,
}

/// A channel capable of submitting a message to a delivery provider.
///
/// Implementations must be safe to share between concurrent sends.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit `message` once.
    ///
    /// Any response from the provider, whatever its status, is returned as
    /// `Ok`; `Err` means no response was obtained.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request could not be completed.
    async fn send(&self, message: &Message) -> Result<TransportResponse, TransportError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
