//! Error types for analytical pricing operations.

use crate::market::MarketError;
use crate::models::HestonError;
use pricer_core::types::SolverError;
use thiserror::Error;

/// Errors from closed-form and semi-analytic pricers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Volatility must be positive and finite.
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// Offending volatility
        volatility: f64,
    },

    /// Strike must be positive and finite.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// Offending strike
        strike: f64,
    },

    /// Time to expiry must be positive and finite.
    #[error("Invalid expiry: T = {expiry}")]
    InvalidExpiry {
        /// Offending year fraction
        expiry: f64,
    },

    /// Quadrature of the characteristic-function integrand failed.
    #[error("Numerical integration failed: {message}")]
    NumericalIntegration {
        /// What went wrong
        message: String,
    },

    /// Price outside the no-arbitrage bounds or root not found.
    #[error("Implied volatility not found: {message}")]
    ImpliedVolatility {
        /// What went wrong
        message: String,
    },

    /// Inconsistent numerical configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid Heston parameters.
    #[error(transparent)]
    Model(#[from] HestonError),

    /// Market state lookup failed.
    #[error(transparent)]
    Market(#[from] MarketError),
}

impl From<SolverError> for AnalyticalError {
    fn from(err: SolverError) -> Self {
        AnalyticalError::ImpliedVolatility {
            message: err.to_string(),
        }
    }
}
