//! Transactional mail delivery through an HTTP mail provider
//!
//! This crate provides:
//! - An exponential [`Backoff`] bounded by a ceiling
//! - A normalized [`RetryPolicy`] owned by the [`Mailer`]
//! - Classification of provider responses into a [`DeliveryOutcome`]
//! - The [`Transport`] seam and its SendGrid implementation
//! - The [`Mailer`] retry loop, which keeps delivering until the provider
//!   accepts the message, rejects the recipient, or shutdown is requested

mod backoff;
mod config;
mod error;
mod mailer;
mod message;
mod outcome;
mod policy;
mod sleeper;
pub mod transport;

pub use backoff::Backoff;
pub use config::MailerConfig;
pub use error::{DeliveryError, PermanentError, TemporaryError, TransportError};
pub use mailer::{Mailer, SendOutcome};
pub use message::{Mailbox, Message};
pub use outcome::{DeliveryOutcome, STATUS_ACCEPTED, STATUS_BAD_RECIPIENT};
pub use policy::{DEFAULT_MAX_RETRY_DELAY, DEFAULT_MIN_RETRY_DELAY, RetryPolicy};
pub use sleeper::{Sleeper, TokioSleeper};
pub use transport::{SendGridTransport, Transport, TransportResponse};
