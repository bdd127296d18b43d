//! Market state shared read-only by every pricing call.

use pricer_core::market_data::{MarketDataError, YieldCurve, ZeroCurve};
use pricer_core::types::Date;
use thiserror::Error;

/// Market state construction and time-mapping errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    /// Spot must be positive and finite.
    #[error("Invalid spot: {0} (must be positive)")]
    InvalidSpot(f64),

    /// Dividend rate must be finite.
    #[error("Invalid dividend rate: {0}")]
    InvalidDividendRate(f64),

    /// Curve valuation date differs from the market valuation date.
    #[error("Curve valuation date {curve} does not match market valuation date {market}")]
    ValuationDateMismatch {
        /// Market valuation date
        market: Date,
        /// Curve valuation date
        curve: Date,
    },

    /// Maturity on or before the valuation date.
    #[error("Maturity {maturity} is not after valuation date {valuation}")]
    MaturityNotAfterValuation {
        /// Requested maturity
        maturity: Date,
        /// Valuation date
        valuation: Date,
    },

    /// Underlying curve error.
    #[error(transparent)]
    Curve(#[from] MarketDataError),
}

/// Valuation date, spot, continuous dividend yield and risk-free curve.
///
/// The valuation date is an explicit field rather than process state, so
/// pricing calls are reentrant.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::ZeroCurve;
/// use pricer_core::types::{Date, DayCountConvention};
/// use pricer_models::market::MarketState;
///
/// let valuation = Date::from_ymd(2021, 11, 22).unwrap();
/// let curve = ZeroCurve::flat(valuation, 0.001, DayCountConvention::Actual365Fixed).unwrap();
/// let market = MarketState::new(valuation, 57_407.27, 0.0, curve).unwrap();
///
/// let expiry = Date::from_ymd(2022, 3, 25).unwrap();
/// assert_eq!(market.days_to(expiry).unwrap(), 123);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    valuation_date: Date,
    spot: f64,
    dividend_rate: f64,
    curve: ZeroCurve,
}

impl MarketState {
    /// Creates a market state.
    ///
    /// # Errors
    ///
    /// Rejects non-positive spot, non-finite dividend rate and a curve
    /// anchored on a different valuation date.
    pub fn new(
        valuation_date: Date,
        spot: f64,
        dividend_rate: f64,
        curve: ZeroCurve,
    ) -> Result<Self, MarketError> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(MarketError::InvalidSpot(spot));
        }
        if !dividend_rate.is_finite() {
            return Err(MarketError::InvalidDividendRate(dividend_rate));
        }
        if curve.valuation_date() != valuation_date {
            return Err(MarketError::ValuationDateMismatch {
                market: valuation_date,
                curve: curve.valuation_date(),
            });
        }
        Ok(Self {
            valuation_date,
            spot,
            dividend_rate,
            curve,
        })
    }

    /// Valuation date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Spot price of the underlying.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Continuous dividend (carry) yield `q`.
    pub fn dividend_rate(&self) -> f64 {
        self.dividend_rate
    }

    /// Risk-free zero curve.
    pub fn curve(&self) -> &ZeroCurve {
        &self.curve
    }

    /// Calendar days from the valuation date to `maturity`.
    ///
    /// # Errors
    ///
    /// `MaturityNotAfterValuation` unless `maturity` is strictly later.
    pub fn days_to(&self, maturity: Date) -> Result<i64, MarketError> {
        let days = maturity - self.valuation_date;
        if days <= 0 {
            return Err(MarketError::MaturityNotAfterValuation {
                maturity,
                valuation: self.valuation_date,
            });
        }
        Ok(days)
    }

    /// Year fraction to `maturity` under the curve's day count.
    pub fn time_to(&self, maturity: Date) -> Result<f64, MarketError> {
        self.days_to(maturity)?;
        Ok(self.curve.year_fraction(maturity))
    }

    /// Zero rate `r(T)` at time `t`.
    pub fn rate(&self, t: f64) -> Result<f64, MarketError> {
        Ok(self.curve.zero_rate(t)?)
    }

    /// Risk-free discount factor `exp(-r(T)·T)`.
    pub fn discount(&self, t: f64) -> Result<f64, MarketError> {
        Ok(self.curve.discount_factor(t)?)
    }

    /// Dividend discount factor `exp(-q·T)`.
    pub fn dividend_discount(&self, t: f64) -> f64 {
        (-self.dividend_rate * t).exp()
    }

    /// Forward `S·exp((r(T) - q)·T)`.
    pub fn forward(&self, t: f64) -> Result<f64, MarketError> {
        Ok(self.spot * self.dividend_discount(t) / self.discount(t)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::types::DayCountConvention;

    fn valuation() -> Date {
        Date::from_ymd(2021, 11, 22).unwrap()
    }

    fn market(rate: f64, q: f64) -> MarketState {
        let curve = ZeroCurve::flat(valuation(), rate, DayCountConvention::Actual365Fixed).unwrap();
        MarketState::new(valuation(), 100.0, q, curve).unwrap()
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let curve = ZeroCurve::flat(valuation(), 0.01, DayCountConvention::Actual365Fixed).unwrap();
        assert_eq!(
            MarketState::new(valuation(), 0.0, 0.0, curve.clone()),
            Err(MarketError::InvalidSpot(0.0))
        );
        assert!(MarketState::new(valuation(), 100.0, f64::NAN, curve.clone()).is_err());
        let other = valuation().add_days(1).unwrap();
        assert!(matches!(
            MarketState::new(other, 100.0, 0.0, curve),
            Err(MarketError::ValuationDateMismatch { .. })
        ));
    }

    #[test]
    fn test_time_mapping() {
        let m = market(0.01, 0.0);
        let expiry = Date::from_ymd(2022, 11, 22).unwrap();
        assert_eq!(m.days_to(expiry).unwrap(), 365);
        assert_relative_eq!(m.time_to(expiry).unwrap(), 1.0);
        assert!(m.days_to(valuation()).is_err());
        assert!(m.time_to(valuation().add_days(-3).unwrap()).is_err());
    }

    #[test]
    fn test_forward_and_discounts() {
        let m = market(0.05, 0.02);
        assert_relative_eq!(m.discount(2.0).unwrap(), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(m.dividend_discount(2.0), (-0.04_f64).exp());
        assert_relative_eq!(m.forward(2.0).unwrap(), 100.0 * 0.06_f64.exp(), epsilon = 1e-12);
        assert_relative_eq!(m.rate(0.3).unwrap(), 0.05);
    }
}
