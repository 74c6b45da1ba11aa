pub mod config;
pub mod controller;

pub use config::{Config, ConfigError};
pub use controller::{Controller, SHUTDOWN_BROADCAST};
