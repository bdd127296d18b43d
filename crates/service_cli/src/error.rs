//! CLI error types.

use pricer_pricing::PricingError;
use thiserror::Error;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be read or parsed
    #[error("Configuration file error: {0}")]
    ConfigFile(String),

    /// Environment variable held an unusable value
    #[error("Environment variable {name}: {message}")]
    Env {
        /// Variable name
        name: String,
        /// What was wrong with the value
        message: String,
    },

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Calibration or pricing failure
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Output could not be rendered
    #[error("Output error: {0}")]
    Output(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
