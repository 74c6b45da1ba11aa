//! Pieces shared by every notifier crate: logging set-up and the shutdown
//! signal broadcast between the controller and in-flight deliveries.

pub mod logging;

pub use tracing;

/// Broadcast to everything holding a shutdown receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
}
