//! Dated zero-rate curve.

use super::{Compounding, YieldCurve};
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::{Interpolator, LinearInterpolator};
use crate::types::{Date, DayCountConvention};

/// One point of a reporting series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePoint {
    /// Year fraction from the valuation date
    pub t: f64,
    /// Zero rate or discount factor at `t`
    pub value: f64,
}

/// Zero-rate term structure built from `(date, rate)` pillars.
///
/// Rates are continuously compounded. Between pillars the zero rate is
/// linear in the year fraction from the valuation date; outside the pillar
/// range it is flat.
///
/// Invariants checked at construction:
/// - at least 2 pillars
/// - pillar dates strictly increasing
/// - first pillar on or before the valuation date
/// - all rates finite
///
/// The curve is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroCurve {
    valuation_date: Date,
    day_count: DayCountConvention,
    dates: Vec<Date>,
    interpolator: LinearInterpolator<f64>,
}

impl ZeroCurve {
    /// Builds a curve from dated pillars.
    ///
    /// # Errors
    ///
    /// `MarketDataError::InvalidCurve` when any invariant is violated.
    pub fn new(
        valuation_date: Date,
        pillars: Vec<(Date, f64)>,
        day_count: DayCountConvention,
    ) -> Result<Self, MarketDataError> {
        if pillars.len() < 2 {
            return Err(MarketDataError::InvalidCurve(format!(
                "need at least 2 pillars, got {}",
                pillars.len()
            )));
        }
        if let Some(w) = pillars.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(MarketDataError::InvalidCurve(format!(
                "pillar dates must be strictly increasing: {} follows {}",
                w[1].0, w[0].0
            )));
        }
        if pillars[0].0 > valuation_date {
            return Err(MarketDataError::InvalidCurve(format!(
                "first pillar {} is after valuation date {}",
                pillars[0].0, valuation_date
            )));
        }
        if let Some((date, rate)) = pillars.iter().find(|(_, r)| !r.is_finite()) {
            return Err(MarketDataError::InvalidCurve(format!(
                "rate at {date} is not finite: {rate}"
            )));
        }

        let times: Vec<f64> = pillars
            .iter()
            .map(|(d, _)| day_count.year_fraction(valuation_date, *d))
            .collect();
        let rates: Vec<f64> = pillars.iter().map(|(_, r)| *r).collect();
        let interpolator = LinearInterpolator::new(&times, &rates)
            .map_err(|e| MarketDataError::InvalidCurve(e.to_string()))?;

        Ok(Self {
            valuation_date,
            day_count,
            dates: pillars.into_iter().map(|(d, _)| d).collect(),
            interpolator,
        })
    }

    /// Flat curve at `rate`, pillared at the valuation date and one year on.
    pub fn flat(
        valuation_date: Date,
        rate: f64,
        day_count: DayCountConvention,
    ) -> Result<Self, MarketDataError> {
        let one_year = valuation_date
            .add_days(365)
            .map_err(|e| MarketDataError::InvalidCurve(e.to_string()))?;
        Self::new(
            valuation_date,
            vec![(valuation_date, rate), (one_year, rate)],
            day_count,
        )
    }

    /// Valuation date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Day count used to map dates to times.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Pillars as `(date, continuously compounded rate)`.
    pub fn pillars(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates
            .iter()
            .copied()
            .zip(self.interpolator.ys().iter().copied())
    }

    /// Year fraction from the valuation date to `date`.
    pub fn year_fraction(&self, date: Date) -> f64 {
        self.day_count.year_fraction(self.valuation_date, date)
    }

    /// Zero rate at `t` quoted with `compounding`.
    pub fn zero_rate_compounded(
        &self,
        t: f64,
        compounding: Compounding,
    ) -> Result<f64, MarketDataError> {
        Ok(compounding.from_continuous(self.zero_rate(t)?))
    }

    /// Zero rates on the monthly grid `t = i/12, i = 0..=12·horizon`.
    pub fn zero_rate_series(
        &self,
        horizon_years: f64,
        compounding: Compounding,
    ) -> Result<Vec<CurvePoint>, MarketDataError> {
        monthly_grid(horizon_years)?
            .into_iter()
            .map(|t| {
                Ok(CurvePoint {
                    t,
                    value: self.zero_rate_compounded(t, compounding)?,
                })
            })
            .collect()
    }

    /// Discount factors on the monthly grid `t = i/12, i = 0..=12·horizon`.
    pub fn discount_series(&self, horizon_years: f64) -> Result<Vec<CurvePoint>, MarketDataError> {
        monthly_grid(horizon_years)?
            .into_iter()
            .map(|t| {
                Ok(CurvePoint {
                    t,
                    value: self.discount_factor(t)?,
                })
            })
            .collect()
    }
}

impl YieldCurve<f64> for ZeroCurve {
    fn zero_rate(&self, t: f64) -> Result<f64, MarketDataError> {
        if !t.is_finite() || t < 0.0 {
            return Err(MarketDataError::InvalidMaturity { t });
        }
        Ok(self.interpolator.interpolate(t))
    }
}

/// Longest horizon, in years, accepted by the series exports.
const MAX_SERIES_HORIZON: f64 = 1_000.0;

fn monthly_grid(horizon_years: f64) -> Result<Vec<f64>, MarketDataError> {
    if !horizon_years.is_finite() || !(0.0..=MAX_SERIES_HORIZON).contains(&horizon_years) {
        return Err(MarketDataError::InvalidMaturity { t: horizon_years });
    }
    let months = (horizon_years * 12.0).round() as usize;
    Ok((0..=months).map(|i| i as f64 / 12.0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn btc_curve() -> ZeroCurve {
        let valuation = date(2021, 11, 22);
        let pillars = vec![
            (date(2021, 11, 22), 0.000_912_498_86),
            (date(2021, 11, 23), 0.000_912_498_86),
            (date(2022, 2, 23), 0.001_417_139_16),
            (date(2022, 5, 23), 0.001_789_912_17),
            (date(2022, 11, 23), 0.003_087_135_17),
        ];
        ZeroCurve::new(valuation, pillars, DayCountConvention::Actual365Fixed).unwrap()
    }

    // ========================================
    // Construction
    // ========================================

    #[test]
    fn test_rejects_single_pillar() {
        let v = date(2021, 11, 22);
        let err = ZeroCurve::new(v, vec![(v, 0.01)], DayCountConvention::Actual365Fixed);
        assert!(matches!(err, Err(MarketDataError::InvalidCurve(_))));
    }

    #[test]
    fn test_rejects_non_increasing_dates() {
        let v = date(2021, 11, 22);
        let pillars = vec![(v, 0.01), (date(2022, 1, 1), 0.02), (date(2022, 1, 1), 0.03)];
        let err = ZeroCurve::new(v, pillars, DayCountConvention::Actual365Fixed);
        assert!(matches!(err, Err(MarketDataError::InvalidCurve(_))));
    }

    #[test]
    fn test_rejects_first_pillar_after_valuation() {
        let v = date(2021, 11, 22);
        let pillars = vec![(date(2021, 11, 23), 0.01), (date(2022, 1, 1), 0.02)];
        let err = ZeroCurve::new(v, pillars, DayCountConvention::Actual365Fixed);
        assert!(matches!(err, Err(MarketDataError::InvalidCurve(_))));
    }

    #[test]
    fn test_rejects_nan_rate() {
        let v = date(2021, 11, 22);
        let pillars = vec![(v, 0.01), (date(2022, 1, 1), f64::NAN)];
        let err = ZeroCurve::new(v, pillars, DayCountConvention::Actual365Fixed);
        assert!(matches!(err, Err(MarketDataError::InvalidCurve(_))));
    }

    // ========================================
    // Interpolation
    // ========================================

    #[test]
    fn test_reprices_pillars() {
        let curve = btc_curve();
        for (d, r) in curve.pillars().collect::<Vec<_>>() {
            let t = curve.year_fraction(d);
            assert_relative_eq!(curve.zero_rate(t).unwrap(), r, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_linear_between_pillars() {
        let curve = btc_curve();
        let t0 = curve.year_fraction(date(2022, 2, 23));
        let t1 = curve.year_fraction(date(2022, 5, 23));
        let mid = 0.5 * (t0 + t1);
        let expected = 0.5 * (0.001_417_139_16 + 0.001_789_912_17);
        assert_relative_eq!(curve.zero_rate(mid).unwrap(), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_flat_extrapolation_beyond_last_pillar() {
        let curve = btc_curve();
        assert_relative_eq!(curve.zero_rate(5.0).unwrap(), 0.003_087_135_17);
    }

    #[test]
    fn test_pillar_before_valuation_date_interpolates() {
        let v = date(2021, 11, 22);
        let pillars = vec![(date(2021, 11, 1), 0.02), (date(2022, 11, 1), 0.04)];
        let curve = ZeroCurve::new(v, pillars, DayCountConvention::Actual365Fixed).unwrap();
        let t_first = curve.year_fraction(date(2021, 11, 1));
        assert!(t_first < 0.0);
        let t_last = curve.year_fraction(date(2022, 11, 1));
        let expected = 0.02 + 0.02 * (0.0 - t_first) / (t_last - t_first);
        assert_relative_eq!(curve.zero_rate(0.0).unwrap(), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_negative_time_rejected() {
        let curve = btc_curve();
        assert!(matches!(
            curve.zero_rate(-0.1),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
    }

    // ========================================
    // Discounting and Series
    // ========================================

    #[test]
    fn test_discount_at_zero_is_one() {
        assert_eq!(btc_curve().discount_factor(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_discount_strictly_decreasing() {
        let curve = btc_curve();
        let series = curve.discount_series(3.0).unwrap();
        assert_eq!(series.len(), 37);
        assert!(series.windows(2).all(|w| w[1].value < w[0].value));
    }

    #[test]
    fn test_zero_rate_series_grid_and_compounding() {
        let curve = btc_curve();
        let annual = curve.zero_rate_series(1.0, Compounding::Annual).unwrap();
        let cont = curve.zero_rate_series(1.0, Compounding::Continuous).unwrap();
        assert_eq!(annual.len(), 13);
        assert_relative_eq!(annual[6].t, 0.5);
        for (a, c) in annual.iter().zip(&cont) {
            assert_relative_eq!(a.value, c.value.exp_m1(), epsilon = 1e-15);
        }
        assert_relative_eq!(cont[0].value, 0.000_912_498_86);
    }

    #[test]
    fn test_series_rejects_negative_horizon() {
        assert!(btc_curve().discount_series(-1.0).is_err());
    }

    #[test]
    fn test_series_rejects_oversized_horizon() {
        let curve = btc_curve();
        assert!(matches!(
            curve.zero_rate_series(1e17, Compounding::Annual),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
        assert!(matches!(
            curve.discount_series(MAX_SERIES_HORIZON + 1.0),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
        assert_eq!(curve.discount_series(MAX_SERIES_HORIZON).unwrap().len(), 12_001);
    }

    #[test]
    fn test_flat_constructor() {
        let curve =
            ZeroCurve::flat(date(2024, 1, 1), 0.05, DayCountConvention::Actual365Fixed).unwrap();
        assert_relative_eq!(curve.zero_rate(7.0).unwrap(), 0.05);
        assert_relative_eq!(curve.discount_factor(2.0).unwrap(), (-0.1_f64).exp(), epsilon = 1e-15);
    }
}
