//! Error types for the Monte Carlo engine.

use pricer_models::market::MarketError;
use pricer_models::models::HestonError;
use thiserror::Error;

use super::config::{MAX_PATHS, MAX_STEPS};

/// Simulation set-up and run errors.
///
/// Path count, step count and parameter errors are the
/// "invalid simulation parameters" family; see
/// [`SimulationError::is_invalid_parameters`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Path count outside `[1, MAX_PATHS]`.
    #[error("Invalid path count {0}: must be in range [1, {max}]", max = MAX_PATHS)]
    InvalidPathCount(usize),

    /// Step count outside `[1, MAX_STEPS]`.
    #[error("Invalid step count {0}: must be in range [1, {max}]", max = MAX_STEPS)]
    InvalidStepCount(usize),

    /// Invalid scalar input.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Description of the invalid value
        value: String,
    },

    /// Heston parameters out of range.
    #[error(transparent)]
    Model(#[from] HestonError),

    /// Maturity or drift lookup failed.
    #[error(transparent)]
    Market(#[from] MarketError),
}

impl SimulationError {
    /// Whether the error is a bad path count, step count or scalar input.
    pub fn is_invalid_parameters(&self) -> bool {
        matches!(
            self,
            SimulationError::InvalidPathCount(_)
                | SimulationError::InvalidStepCount(_)
                | SimulationError::InvalidParameter { .. }
                | SimulationError::Model(_)
        )
    }
}
