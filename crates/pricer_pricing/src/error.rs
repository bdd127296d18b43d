//! Session-level error taxonomy.
//!
//! Every lower-layer error folds into one of six kinds. Only
//! [`PricingError::CalibrationDidNotConverge`] is non-fatal: it carries the
//! last iterate, which the caller may still use.

use crate::mc::SimulationError;
use pricer_core::market_data::MarketDataError;
use pricer_core::types::DateError;
use pricer_models::analytical::AnalyticalError;
use pricer_models::calibration::CalibrationError;
use pricer_models::instruments::InstrumentError;
use pricer_models::market::MarketError;
use pricer_models::models::{HestonError, HestonParams};
use thiserror::Error;

/// Errors returned by the session API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Malformed term-structure input.
    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    /// Characteristic-function quadrature failed.
    #[error("Numerical integration failed: {0}")]
    NumericalIntegration(String),

    /// Calibration hit its iteration cap; `params` is the last iterate.
    #[error("Calibration did not converge after {iterations} iterations (rmse: {rmse:.6e})")]
    CalibrationDidNotConverge {
        /// Last iterate
        params: HestonParams,
        /// Iterations performed
        iterations: usize,
        /// Root mean square residual at `params`
        rmse: f64,
    },

    /// Bad path count, step count or simulation input.
    #[error("Invalid simulation parameters: {0}")]
    InvalidSimulationParameters(String),

    /// A barrier product was requested without its barrier level.
    #[error("Missing barrier input: {0}")]
    MissingBarrierInput(String),

    /// Any other rejected input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PricingError {
    /// Whether the call produced nothing usable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PricingError::CalibrationDidNotConverge { .. })
    }

    /// Last iterate of a non-converged calibration.
    pub fn last_iterate(&self) -> Option<&HestonParams> {
        match self {
            PricingError::CalibrationDidNotConverge { params, .. } => Some(params),
            _ => None,
        }
    }
}

impl From<MarketDataError> for PricingError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::InvalidCurve(message) => PricingError::InvalidCurve(message),
            other => PricingError::InvalidInput(other.to_string()),
        }
    }
}

impl From<MarketError> for PricingError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Curve(inner) => inner.into(),
            other => PricingError::InvalidInput(other.to_string()),
        }
    }
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        match err {
            AnalyticalError::NumericalIntegration { message } => {
                PricingError::NumericalIntegration(message)
            }
            AnalyticalError::Market(inner) => inner.into(),
            other => PricingError::InvalidInput(other.to_string()),
        }
    }
}

impl From<CalibrationError> for PricingError {
    fn from(err: CalibrationError) -> Self {
        match err {
            CalibrationError::DidNotConverge {
                params,
                iterations,
                rmse,
            } => PricingError::CalibrationDidNotConverge {
                params,
                iterations,
                rmse,
            },
            CalibrationError::Pricing(inner) => inner.into(),
            CalibrationError::Market(inner) => inner.into(),
            other => PricingError::InvalidInput(other.to_string()),
        }
    }
}

impl From<SimulationError> for PricingError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Market(inner) => inner.into(),
            other => PricingError::InvalidSimulationParameters(other.to_string()),
        }
    }
}

impl From<InstrumentError> for PricingError {
    fn from(err: InstrumentError) -> Self {
        match err {
            InstrumentError::MissingBarrier { .. } => {
                PricingError::MissingBarrierInput(err.to_string())
            }
            other => PricingError::InvalidInput(other.to_string()),
        }
    }
}

impl From<HestonError> for PricingError {
    fn from(err: HestonError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}

impl From<DateError> for PricingError {
    fn from(err: DateError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}
