//! SendGrid v3 mail-send transport

use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde::Serialize;

use super::{Transport, TransportResponse};
use crate::{
    error::TransportError,
    message::{Mailbox, Message},
};

/// Production API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com";

/// Upper bound on a single request when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAIL_SEND_PATH: &str = "/v3/mail/send";

/// Submits messages to the SendGrid v3 `mail/send` endpoint.
///
/// The client is cheap to clone and shares its connection pool.
#[derive(Clone)]
pub struct SendGridTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl SendGridTransport {
    /// Transport for the production SendGrid API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Transport for an arbitrary API base URL. A request that has not
    /// completed within `timeout` fails with [`TransportError::Timeout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: format!("{}{MAIL_SEND_PATH}", endpoint.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }
}

impl fmt::Debug for SendGridTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendGridTransport")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SendGridTransport {
    async fn send(&self, message: &Message) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&MailSend::from(message))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}

/// Request body for `POST /v3/mail/send`.
#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: &'a Mailbox,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [&'a Mailbox; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl<'a> From<&'a Message> for MailSend<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            personalizations: [Personalization {
                to: [message.recipient()],
            }],
            from: message.sender(),
            subject: message.subject(),
            content: [Content {
                kind: "text/html",
                value: message.body(),
            }],
        }
    }
}
