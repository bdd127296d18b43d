//! Yield curve trait definition.

use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Term structure of continuously compounded zero rates.
///
/// Times are year fractions from the curve's valuation date. Implementors
/// provide `zero_rate`; the discount factor follows as `exp(-r(t)·t)`.
pub trait YieldCurve<T: Float> {
    /// Continuously compounded zero rate for maturity `t >= 0`.
    fn zero_rate(&self, t: T) -> Result<T, MarketDataError>;

    /// Discount factor `exp(-r(t)·t)`.
    fn discount_factor(&self, t: T) -> Result<T, MarketDataError> {
        let r = self.zero_rate(t)?;
        Ok((-r * t).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FlatCurve {
        rate: f64,
    }

    impl YieldCurve<f64> for FlatCurve {
        fn zero_rate(&self, t: f64) -> Result<f64, MarketDataError> {
            if t < 0.0 {
                return Err(MarketDataError::InvalidMaturity { t });
            }
            Ok(self.rate)
        }
    }

    #[test]
    fn test_default_discount_factor() {
        let curve = FlatCurve { rate: 0.05 };
        assert_relative_eq!(curve.discount_factor(2.0).unwrap(), (-0.1_f64).exp());
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
        assert!(curve.discount_factor(-1.0).is_err());
    }
}
