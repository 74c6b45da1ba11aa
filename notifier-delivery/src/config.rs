use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{message::Mailbox, policy::RetryPolicy, transport::DEFAULT_REQUEST_TIMEOUT};

/// Settings for a [`Mailer`](crate::Mailer).
///
/// Retry delays default to zero, which normalization turns into
/// [`DEFAULT_MIN_RETRY_DELAY`](crate::DEFAULT_MIN_RETRY_DELAY) and
/// [`DEFAULT_MAX_RETRY_DELAY`](crate::DEFAULT_MAX_RETRY_DELAY).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Sender address
    pub from: String,

    /// Sender display name
    #[serde(default)]
    pub from_name: String,

    /// SendGrid API key
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the SendGrid API
    ///
    /// Default: `https://api.sendgrid.com`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Timeout for a single request to the provider (in seconds)
    ///
    /// Default: 30 seconds. Zero also means the default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Delay before the first retry (in seconds)
    ///
    /// Each further retry doubles the delay up to `max_retry_delay_secs`.
    #[serde(default)]
    pub min_retry_delay_secs: u64,

    /// Ceiling for the delay between retries (in seconds)
    #[serde(default)]
    pub max_retry_delay_secs: u64,
}

impl MailerConfig {
    /// The normalized retry policy for these settings.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_secs(self.min_retry_delay_secs),
            Duration::from_secs(self.max_retry_delay_secs),
        )
    }

    #[must_use]
    pub fn sender(&self) -> Mailbox {
        Mailbox::new(self.from_name.clone(), self.from.clone())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|&secs| secs > 0)
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs)
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("min_retry_delay_secs", &self.min_retry_delay_secs)
            .field("max_retry_delay_secs", &self.max_retry_delay_secs)
            .finish()
    }
}
