//! Session-level pricing API.
//!
//! A session starts from a [`MarketState`], calibrates [`HestonParams`] to an
//! implied-vol surface once, then prices any number of requests against
//! those parameters:
//!
//! ```text
//! build_market_state ──► PricingSession::calibrate ──► HestonParams
//!                                                          │
//!        ┌──────────────────────┬──────────────────────────┤
//!        ▼                      ▼                          ▼
//!   price_vanilla         price_digital          price_barrier_down_out
//!   (Fourier)             (paths, indicator)     (paths, knock-out)
//! ```
//!
//! Nothing is cached between calls; every Monte Carlo request simulates
//! fresh paths.

mod data;

pub use data::{MarketSnapshot, RatePillar};

use crate::error::PricingError;
use crate::evaluators::{BarrierEvaluator, DigitalEvaluator, VanillaEvaluator};
use crate::mc::{HestonPathSimulator, McEstimate, MonteCarloConfig};
use pricer_core::market_data::{Compounding, CurvePoint, VolSurface, ZeroCurve};
use pricer_core::types::{Date, DayCountConvention};
use pricer_models::calibration::{CalibrationOutcome, HestonCalibrator, HestonCalibratorConfig};
use pricer_models::instruments::{OptionSpec, OptionType};
use pricer_models::market::MarketState;
use pricer_models::models::HestonParams;
use tracing::info;

/// Builds the session market state with an Actual/365 Fixed zero curve.
///
/// # Errors
///
/// `InvalidCurve` for fewer than two pillars, unsorted pillar dates or a
/// first pillar after the valuation date; `InvalidInput` for a bad spot.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::Date;
/// use pricer_pricing::session::build_market_state;
///
/// let today = Date::from_ymd(2021, 11, 22).unwrap();
/// let pillars = vec![(today, 0.001), (Date::from_ymd(2022, 11, 23).unwrap(), 0.003)];
/// let market = build_market_state(today, 57_407.27, 0.0, pillars).unwrap();
/// assert_eq!(market.discount(0.0).unwrap(), 1.0);
/// ```
pub fn build_market_state(
    valuation_date: Date,
    spot: f64,
    dividend_rate: f64,
    rate_pillars: Vec<(Date, f64)>,
) -> Result<MarketState, PricingError> {
    let curve = ZeroCurve::new(valuation_date, rate_pillars, DayCountConvention::Actual365Fixed)?;
    Ok(MarketState::new(valuation_date, spot, dividend_rate, curve)?)
}

/// Zero rates on a monthly grid out to `horizon_years`.
pub fn zero_curve_series(
    market: &MarketState,
    horizon_years: f64,
    compounding: Compounding,
) -> Result<Vec<CurvePoint>, PricingError> {
    Ok(market.curve().zero_rate_series(horizon_years, compounding)?)
}

/// Discount factors on a monthly grid out to `horizon_years`.
pub fn discount_curve_series(
    market: &MarketState,
    horizon_years: f64,
) -> Result<Vec<CurvePoint>, PricingError> {
    Ok(market.curve().discount_series(horizon_years)?)
}

/// NPV of one request, with a standard error for simulated products.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Valuation {
    /// Net present value
    pub npv: f64,
    /// Monte Carlo standard error
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub std_error: Option<f64>,
    /// Monte Carlo path count
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub n_paths: Option<usize>,
}

impl Valuation {
    /// Closed-form result.
    pub fn analytic(npv: f64) -> Self {
        Self {
            npv,
            std_error: None,
            n_paths: None,
        }
    }
}

impl From<McEstimate> for Valuation {
    fn from(estimate: McEstimate) -> Self {
        Self {
            npv: estimate.value,
            std_error: Some(estimate.std_error),
            n_paths: Some(estimate.n_paths),
        }
    }
}

/// Settings shared by every call of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Calibrator settings, including the Fourier quadrature
    pub calibration: HestonCalibratorConfig,
    /// Path simulator settings
    pub monte_carlo: MonteCarloConfig,
    /// Present-value the digital payoff
    pub discount_digital: bool,
    /// Calibration starting point
    pub initial_guess: HestonParams,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            calibration: HestonCalibratorConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
            discount_digital: false,
            initial_guess: HestonParams::default(),
        }
    }
}

/// Calibration and pricing entry points.
///
/// The session holds configuration only; parameters and market state are
/// passed to every call, so one session serves any number of threads.
#[derive(Debug, Clone)]
pub struct PricingSession {
    settings: SessionSettings,
    calibrator: HestonCalibrator,
    vanilla: VanillaEvaluator,
}

impl PricingSession {
    /// Creates a session.
    pub fn new(settings: SessionSettings) -> Result<Self, PricingError> {
        settings.monte_carlo.validate()?;
        settings.initial_guess.validate()?;
        let calibrator = HestonCalibrator::new(settings.calibration.clone())?;
        let vanilla = VanillaEvaluator::from_pricer(calibrator.pricer().clone());
        Ok(Self {
            settings,
            calibrator,
            vanilla,
        })
    }

    /// Settings in use.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Calibrates to the `expiries` slices of `surface` (all slices when empty).
    ///
    /// Non-convergence is reported in-band through `converged`; use
    /// [`PricingSession::calibrate_strict`] to make it fatal.
    pub fn calibrate(
        &self,
        market: &MarketState,
        surface: &VolSurface,
        expiries: &[Date],
    ) -> Result<CalibrationOutcome, PricingError> {
        let expiries = if expiries.is_empty() {
            surface.expiries()
        } else {
            expiries
        };
        let outcome =
            self.calibrator
                .calibrate(market, surface, expiries, &self.settings.initial_guess)?;
        info!(
            converged = outcome.converged,
            iterations = outcome.iterations,
            rmse = outcome.rmse,
            n_slices = expiries.len(),
            "session calibrated"
        );
        Ok(outcome)
    }

    /// Calibrates and fails with `CalibrationDidNotConverge` (carrying the
    /// last iterate) when the iteration cap is hit.
    pub fn calibrate_strict(
        &self,
        market: &MarketState,
        surface: &VolSurface,
        expiries: &[Date],
    ) -> Result<HestonParams, PricingError> {
        Ok(self.calibrate(market, surface, expiries)?.ensure_converged()?)
    }

    /// Vanilla NPV via the characteristic-function pricer.
    pub fn price_vanilla(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
        strike: f64,
        option_type: OptionType,
    ) -> Result<f64, PricingError> {
        self.vanilla
            .npv(market, params, maturity, strike, option_type)
    }

    /// Digital NPV from `n_paths` simulated paths.
    pub fn price_digital(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
        strike: f64,
        option_type: OptionType,
        n_paths: usize,
    ) -> Result<McEstimate, PricingError> {
        DigitalEvaluator::new(self.simulator(n_paths)?, self.settings.discount_digital)
            .npv(market, params, maturity, strike, option_type)
    }

    /// Down-and-out barrier NPV from `n_paths` simulated paths.
    #[allow(clippy::too_many_arguments)]
    pub fn price_barrier_down_out(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
        strike: f64,
        barrier: Option<f64>,
        option_type: OptionType,
        n_paths: usize,
    ) -> Result<McEstimate, PricingError> {
        BarrierEvaluator::down_and_out(self.simulator(n_paths)?)
            .npv(market, params, maturity, strike, barrier, option_type)
    }

    /// Prices any [`OptionSpec`]; `n_paths` defaults to the session setting.
    pub fn price(
        &self,
        market: &MarketState,
        params: &HestonParams,
        spec: &OptionSpec,
        n_paths: Option<usize>,
    ) -> Result<Valuation, PricingError> {
        let n_paths = n_paths.unwrap_or(self.settings.monte_carlo.n_paths());
        let terms = spec.terms();
        match spec {
            OptionSpec::Vanilla(_) => self
                .price_vanilla(market, params, terms.maturity, terms.strike, terms.option_type)
                .map(Valuation::analytic),
            OptionSpec::Digital(_) => self
                .price_digital(
                    market,
                    params,
                    terms.maturity,
                    terms.strike,
                    terms.option_type,
                    n_paths,
                )
                .map(Valuation::from),
            OptionSpec::Barrier { barrier, .. } => self
                .price_barrier_down_out(
                    market,
                    params,
                    terms.maturity,
                    terms.strike,
                    *barrier,
                    terms.option_type,
                    n_paths,
                )
                .map(Valuation::from),
        }
    }

    fn simulator(&self, n_paths: usize) -> Result<HestonPathSimulator, PricingError> {
        let config = self.settings.monte_carlo.with_paths(n_paths)?;
        Ok(HestonPathSimulator::new(config)?)
    }
}
