//! Market snapshots: the raw inputs of a pricing session.

use super::build_market_state;
use crate::error::PricingError;
use pricer_core::market_data::VolSurface;
use pricer_core::types::Date;
use pricer_models::market::MarketState;

/// One `(date, continuously compounded zero rate)` pillar.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatePillar {
    /// Pillar date
    pub date: Date,
    /// Zero rate at `date`
    pub rate: f64,
}

/// Plain market inputs as delivered by a data loader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketSnapshot {
    /// Valuation date
    pub valuation_date: Date,
    /// Spot price
    pub spot: f64,
    /// Continuous dividend rate
    pub dividend_rate: f64,
    /// Zero-rate pillars
    pub rate_pillars: Vec<RatePillar>,
    /// Surface expiries, increasing
    pub expiries: Vec<Date>,
    /// Surface strikes, increasing
    pub strikes: Vec<f64>,
    /// Implied vols, one row per expiry
    pub vols: Vec<Vec<f64>>,
    /// Expiry slices used for calibration
    pub calibration_expiries: Vec<Date>,
}

impl MarketSnapshot {
    /// Bitcoin session of 22 November 2021.
    ///
    /// Spot 57 407.27, no dividend, five zero-rate pillars out to one year
    /// and a 3 × 9 implied-vol surface. Calibration uses the March 2022 slice.
    ///
    /// ```rust
    /// use pricer_pricing::session::MarketSnapshot;
    ///
    /// let snapshot = MarketSnapshot::btc_2021_11_22().unwrap();
    /// let market = snapshot.market_state().unwrap();
    /// assert_eq!(market.spot(), 57_407.27);
    /// assert_eq!(snapshot.vol_surface().unwrap().strikes().len(), 9);
    /// ```
    pub fn btc_2021_11_22() -> Result<Self, PricingError> {
        let pillar = |y, m, d, rate| -> Result<RatePillar, PricingError> {
            Ok(RatePillar {
                date: Date::from_ymd(y, m, d)?,
                rate,
            })
        };
        Ok(Self {
            valuation_date: Date::from_ymd(2021, 11, 22)?,
            spot: 57_407.27,
            dividend_rate: 0.0,
            rate_pillars: vec![
                pillar(2021, 11, 22, 0.000_912_498_86)?,
                pillar(2021, 11, 23, 0.000_912_498_86)?,
                pillar(2022, 2, 23, 0.001_417_139_16)?,
                pillar(2022, 5, 23, 0.001_789_912_17)?,
                pillar(2022, 11, 23, 0.003_087_135_17)?,
            ],
            expiries: vec![
                Date::from_ymd(2021, 12, 31)?,
                Date::from_ymd(2022, 3, 25)?,
                Date::from_ymd(2022, 6, 24)?,
            ],
            strikes: vec![
                30_000.0, 40_000.0, 50_000.0, 60_000.0, 70_000.0, 80_000.0, 90_000.0, 100_000.0,
                120_000.0,
            ],
            vols: vec![
                vec![1.1340, 0.9864, 0.8955, 0.8344, 0.8328, 0.8692, 0.9165, 0.9808, 1.0735],
                vec![1.0149, 0.9587, 0.9241, 0.9046, 0.9000, 0.9055, 0.9177, 0.9338, 0.9684],
                vec![0.9697, 0.9399, 0.9193, 0.9098, 0.9073, 0.9089, 0.9128, 0.9181, 0.9497],
            ],
            calibration_expiries: vec![Date::from_ymd(2022, 3, 25)?],
        })
    }

    /// Market state built from the snapshot.
    pub fn market_state(&self) -> Result<MarketState, PricingError> {
        build_market_state(
            self.valuation_date,
            self.spot,
            self.dividend_rate,
            self.rate_pillars.iter().map(|p| (p.date, p.rate)).collect(),
        )
    }

    /// Implied-vol surface built from the snapshot.
    pub fn vol_surface(&self) -> Result<VolSurface, PricingError> {
        Ok(VolSurface::new(
            self.expiries.clone(),
            self.strikes.clone(),
            self.vols.clone(),
        )?)
    }
}
