use std::sync::LazyLock;

use notifier_common::{Signal, internal};
use notifier_delivery::{Mailer, SendOutcome};
use tokio::sync::broadcast;

use crate::config::Config;

pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

#[tracing::instrument(level = "trace")]
async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            internal!("CTRL+C entered -- cancelling pending retries");
        }
        _ = terminate.recv() => {
            internal!("Terminate Signal received, cancelling pending retries");
        }
    };

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    Ok(())
}

/// Owns the [`Mailer`] and ties its deliveries to process shutdown.
#[derive(Debug)]
pub struct Controller {
    mailer: Mailer,
}

impl Controller {
    /// # Errors
    ///
    /// Returns an error if the mail transport cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            mailer: Mailer::from_config(&config.mailer)?,
        })
    }

    #[must_use]
    pub const fn from_mailer(mailer: Mailer) -> Self {
        Self { mailer }
    }

    #[must_use]
    pub const fn mailer(&self) -> &Mailer {
        &self.mailer
    }

    /// Send one email, retrying until it is delivered, the recipient is
    /// rejected, or a shutdown signal arrives.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> SendOutcome {
        internal!("Controller sending to {}", to);

        let receiver = SHUTDOWN_BROADCAST.subscribe();
        let listener = tokio::spawn(async {
            if let Err(e) = shutdown().await {
                tracing::error!(error = %e, "Failed to listen for shutdown");
            }
        });

        let message = self.mailer.create_email(to, subject, body);
        let outcome = self
            .mailer
            .send_email_until_shutdown(to, &message, receiver)
            .await;

        listener.abort();
        internal!("Controller finished sending to {}", to);

        outcome
    }
}
