//! Delivery retry loop
//!
//! A [`Mailer`] keeps submitting one message until the provider accepts it or
//! rejects the recipient outright. Between attempts it waits according to a
//! fresh [`Backoff`](crate::Backoff) built from its [`RetryPolicy`], so the
//! delay doubles up to the policy's ceiling and then stays there. There is no
//! attempt limit; callers that need an upper bound pass a shutdown receiver.
//!
//! A shutdown that arrives while an attempt is still waiting on the provider
//! abandons that attempt. Each attempt is otherwise bounded by the transport's
//! own request timeout.

use std::{fmt, sync::Arc, time::Duration};

use notifier_common::{Signal, internal};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    config::MailerConfig,
    error::{DeliveryError, PermanentError, TransportError},
    message::{Mailbox, Message},
    outcome::DeliveryOutcome,
    policy::RetryPolicy,
    sleeper::{Sleeper, TokioSleeper},
    transport::{SendGridTransport, Transport, TransportResponse},
};

/// How a call to [`Mailer::send_email`] ended.
#[derive(Debug)]
pub enum SendOutcome {
    /// The provider accepted the message.
    Delivered { attempts: u32 },
    /// The provider rejected the recipient; no further attempts were made.
    Rejected {
        attempts: u32,
        reason: PermanentError,
    },
    /// Shutdown was requested while waiting to retry.
    Cancelled { attempts: u32 },
}

impl SendOutcome {
    /// Number of delivery attempts made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts }
            | Self::Rejected { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Where a delivery sequence currently stands.
#[derive(Debug)]
enum DeliveryState {
    Attempting,
    Waiting(Duration),
    Succeeded,
    TerminallyFailed(PermanentError),
    Cancelled,
}

/// Sends mail through a [`Transport`], retrying with exponential backoff.
///
/// A `Mailer` holds no per-send state, so one instance (usually behind an
/// [`Arc`]) can serve any number of concurrent sends.
pub struct Mailer {
    sender: Mailbox,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("sender", &self.sender)
            .field("policy", &self.policy)
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}

impl Mailer {
    /// Mailer that waits on the tokio timer between attempts.
    #[must_use]
    pub fn new(sender: Mailbox, policy: RetryPolicy, transport: Arc<dyn Transport>) -> Self {
        Self {
            sender,
            policy,
            transport,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Mailer delivering through SendGrid, as described by `config`.
    ///
    /// Invalid retry delays are normalized, never rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &MailerConfig) -> Result<Self, TransportError> {
        let transport = SendGridTransport::with_endpoint(
            config.api_key.clone(),
            config
                .endpoint
                .as_deref()
                .unwrap_or(crate::transport::DEFAULT_ENDPOINT),
            config.request_timeout(),
        )?;

        Ok(Self::new(
            config.sender(),
            config.retry_policy(),
            Arc::new(transport),
        ))
    }

    /// Replace the sleeper used between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[must_use]
    pub const fn sender(&self) -> &Mailbox {
        &self.sender
    }

    /// Build a message from the configured sender to `to`.
    ///
    /// The recipient's display name is the address itself.
    #[must_use]
    pub fn create_email(&self, to: &str, subject: &str, body: &str) -> Message {
        Message::new(self.sender.clone(), Mailbox::new(to, to), subject, body)
    }

    /// Deliver `message`, retrying until it is accepted or the recipient is
    /// rejected.
    ///
    /// Transport errors and unexpected statuses are retried forever. Every
    /// attempt is logged; the returned [`SendOutcome`] is informational.
    pub async fn send_email(&self, recipient: &str, message: &Message) -> SendOutcome {
        self.deliver(recipient, message, None).await
    }

    /// As [`Mailer::send_email`], but give up once a [`Signal::Shutdown`]
    /// arrives on `shutdown`.
    ///
    /// An attempt the provider has not answered yet is abandoned.
    pub async fn send_email_until_shutdown(
        &self,
        recipient: &str,
        message: &Message,
        shutdown: broadcast::Receiver<Signal>,
    ) -> SendOutcome {
        self.deliver(recipient, message, Some(shutdown)).await
    }

    #[tracing::instrument(level = "trace", skip_all, fields(to = %recipient))]
    async fn deliver(
        &self,
        recipient: &str,
        message: &Message,
        mut shutdown: Option<broadcast::Receiver<Signal>>,
    ) -> SendOutcome {
        let mut backoff = self.policy.backoff();
        let mut attempts = 0_u32;
        let mut state = DeliveryState::Attempting;

        loop {
            state = match state {
                DeliveryState::Attempting => {
                    attempts = attempts.saturating_add(1);
                    internal!(
                        "Delivery attempt {} to {} via {}",
                        attempts,
                        recipient,
                        self.transport.name()
                    );

                    match self.attempt(message, shutdown.as_mut()).await {
                        Some(result) => self.record(
                            recipient,
                            attempts,
                            DeliveryOutcome::classify(result),
                            || backoff.advance(),
                        ),
                        None => DeliveryState::Cancelled,
                    }
                }
                DeliveryState::Waiting(delay) => {
                    debug!(to = recipient, delay = ?delay, attempts, "Waiting before retry");

                    if self.wait(delay, shutdown.as_mut()).await {
                        DeliveryState::Attempting
                    } else {
                        DeliveryState::Cancelled
                    }
                }
                DeliveryState::Succeeded => return SendOutcome::Delivered { attempts },
                DeliveryState::TerminallyFailed(reason) => {
                    return SendOutcome::Rejected { attempts, reason };
                }
                DeliveryState::Cancelled => {
                    info!(
                        to = recipient,
                        from = %self.sender.email,
                        attempts,
                        "Email delivery cancelled by shutdown"
                    );
                    return SendOutcome::Cancelled { attempts };
                }
            };
        }
    }

    /// Log the outcome of an attempt and pick the next state.
    fn record(
        &self,
        recipient: &str,
        attempts: u32,
        outcome: DeliveryOutcome,
        next_delay: impl FnOnce() -> Duration,
    ) -> DeliveryState {
        match outcome {
            DeliveryOutcome::Success(response) => {
                info!(
                    to = recipient,
                    from = %self.sender.email,
                    status = response.status,
                    body = %response.body,
                    attempts,
                    "Email sent"
                );
                DeliveryState::Succeeded
            }
            DeliveryOutcome::TerminalFailure(reason) => {
                error!(
                    to = recipient,
                    from = %self.sender.email,
                    error = %reason,
                    attempts,
                    "Failed to send email, recipient rejected"
                );
                DeliveryState::TerminallyFailed(reason)
            }
            DeliveryOutcome::RetryableFailure(reason) => {
                error!(
                    to = recipient,
                    from = %self.sender.email,
                    error = %DeliveryError::from(reason),
                    attempts,
                    "Failed to send email"
                );
                DeliveryState::Waiting(next_delay())
            }
        }
    }

    /// Submit `message` once. Returns `None` if shutdown was requested before
    /// the transport answered.
    ///
    /// A transport that answers straight away wins over a queued shutdown.
    async fn attempt(
        &self,
        message: &Message,
        shutdown: Option<&mut broadcast::Receiver<Signal>>,
    ) -> Option<Result<TransportResponse, TransportError>> {
        let Some(receiver) = shutdown else {
            return Some(self.transport.send(message).await);
        };

        tokio::select! {
            biased;

            result = self.transport.send(message) => Some(result),
            signal = receiver.recv() => {
                log_shutdown(signal, "while an attempt was in flight");
                None
            }
        }
    }

    /// Sleep for `delay`. Returns `false` if shutdown was requested first.
    ///
    /// A shutdown already queued on the receiver wins over the sleep.
    async fn wait(
        &self,
        delay: Duration,
        shutdown: Option<&mut broadcast::Receiver<Signal>>,
    ) -> bool {
        let Some(receiver) = shutdown else {
            self.sleeper.sleep(delay).await;
            return true;
        };

        tokio::select! {
            biased;

            signal = receiver.recv() => {
                log_shutdown(signal, "while waiting to retry");
                false
            }
            () = self.sleeper.sleep(delay) => true,
        }
    }
}

fn log_shutdown(signal: Result<Signal, broadcast::error::RecvError>, during: &str) {
    match signal {
        Ok(signal) => internal!("Delivery received {:?} {}", signal, during),
        Err(e) => warn!(error = %e, "Delivery shutdown channel error {}", during),
    }
}
