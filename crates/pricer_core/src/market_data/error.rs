//! Market data error types.

use crate::types::InterpolationError;
use thiserror::Error;

/// Market data construction and lookup errors.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidCurve("fewer than 2 pillars".to_string());
/// assert_eq!(format!("{}", err), "Invalid curve: fewer than 2 pillars");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Malformed term-structure input.
    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    /// Malformed volatility surface input.
    #[error("Invalid volatility surface: {0}")]
    InvalidSurface(String),

    /// Negative or non-finite time.
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}
