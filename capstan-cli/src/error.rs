//! CLI error type.

use capstan::error::CoreError;
use std::io;

/// Errors surfaced to the terminal user.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded.
    Config(CoreError),
    /// Logging could not be initialized.
    Logging(io::Error),
    /// Tokio runtime construction failed.
    Runtime(io::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Logging(e) => write!(f, "failed to initialize logging: {}", e),
            Self::Runtime(e) => write!(f, "failed to start runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Logging(e) | Self::Runtime(e) => Some(e),
        }
    }
}
