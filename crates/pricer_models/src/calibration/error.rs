//! Calibration error types.

use crate::analytical::AnalyticalError;
use crate::market::MarketError;
use crate::models::{HestonError, HestonParams};
use pricer_core::types::{Date, SolverError};
use thiserror::Error;

/// Errors raised while fitting Heston parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Iteration cap reached; the last iterate is still usable.
    #[error("Calibration did not converge after {iterations} iterations (rmse: {rmse:.6e})")]
    DidNotConverge {
        /// Last iterate
        params: HestonParams,
        /// Iterations performed
        iterations: usize,
        /// Root mean square residual at `params`
        rmse: f64,
    },

    /// Fewer quotes than free parameters.
    #[error("Insufficient market data (required: {required}, provided: {provided})")]
    InsufficientData {
        /// Minimum number of quotes
        required: usize,
        /// Quotes supplied
        provided: usize,
    },

    /// A requested expiry is not on the surface.
    #[error("Expiry {0} is not on the volatility surface")]
    UnknownExpiry(Date),

    /// A market quote cannot be turned into a price.
    #[error("Invalid market quote at strike {strike}: {message}")]
    InvalidQuote {
        /// Strike of the quote
        strike: f64,
        /// What went wrong
        message: String,
    },

    /// The forward model failed at the initial guess.
    #[error("Pricing failed: {0}")]
    Pricing(#[from] AnalyticalError),

    /// Invalid initial guess.
    #[error(transparent)]
    Model(#[from] HestonError),

    /// Maturity mapping failed.
    #[error(transparent)]
    Market(#[from] MarketError),

    /// Optimiser failure.
    #[error("Optimiser failed: {0}")]
    Solver(#[from] SolverError),
}

impl CalibrationError {
    /// Whether the error still carries a usable parameter set.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalibrationError::DidNotConverge { .. })
    }

    /// Last iterate of a non-converged run.
    pub fn last_iterate(&self) -> Option<&HestonParams> {
        match self {
            CalibrationError::DidNotConverge { params, .. } => Some(params),
            _ => None,
        }
    }
}
