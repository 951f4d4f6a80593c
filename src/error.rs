//! Startup errors.
//!
//! Every failure in this crate happens before traffic is served; any of
//! these aborts startup.

use thiserror::Error;

use crate::config::ConfigError;
use crate::rules::RegistryError;

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be read, parsed or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rule provider could not be registered.
    #[error("Rule registration error: {0}")]
    Registry(#[from] RegistryError),

    /// The proxy HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
