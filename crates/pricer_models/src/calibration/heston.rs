//! Heston calibration to an implied-volatility surface.
//!
//! Each `(strike, vol)` quote on the selected expiry slices becomes a
//! calibration helper priced on its out-of-the-money side. The market
//! price comes from Black-Scholes at the quoted vol, the model price from
//! [`HestonFourierPricer`], and Levenberg-Marquardt minimises the sum of
//! squared errors over the unconstrained coordinates of
//! [`transform`](super::transform).
//!
//! Slices are priced in parallel; strikes within a slice share one pass of
//! characteristic-function evaluations.

use super::error::CalibrationError;
use super::result::CalibrationOutcome;
use super::transform::{from_unconstrained, to_unconstrained, N_PARAMS};
use crate::analytical::{
    black_scholes_price, implied_volatility, otm_option_type, BlackScholes, FourierConfig,
    HestonFourierPricer,
};
use crate::instruments::OptionType;
use crate::market::MarketState;
use crate::models::HestonParams;
use pricer_core::market_data::VolSurface;
use pricer_core::math::solvers::{LMConfig, LevenbergMarquardtSolver};
use pricer_core::types::Date;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, trace, warn};

/// How a helper measures its pricing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CalibrationErrorType {
    /// `(model - market) / market`
    #[default]
    RelativePrice,
    /// `model - market`
    Price,
    /// `implied_vol(model) - market_vol`
    ImpliedVol,
}

impl fmt::Display for CalibrationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalibrationErrorType::RelativePrice => "relative_price",
            CalibrationErrorType::Price => "price",
            CalibrationErrorType::ImpliedVol => "implied_vol",
        };
        f.write_str(name)
    }
}

impl FromStr for CalibrationErrorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "relative_price" => Ok(CalibrationErrorType::RelativePrice),
            "price" => Ok(CalibrationErrorType::Price),
            "implied_vol" => Ok(CalibrationErrorType::ImpliedVol),
            other => Err(format!("unknown calibration error type: {other}")),
        }
    }
}

/// Calibrator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HestonCalibratorConfig {
    /// Optimiser settings
    pub lm: LMConfig,
    /// Helper error measure
    pub error_type: CalibrationErrorType,
    /// Forward-model quadrature settings
    pub fourier: FourierConfig,
}

impl Default for HestonCalibratorConfig {
    fn default() -> Self {
        Self {
            // Finite differences must sit well above the quadrature noise.
            lm: LMConfig {
                jacobian_step: 1e-6,
                ..LMConfig::default()
            },
            error_type: CalibrationErrorType::default(),
            fourier: FourierConfig::default(),
        }
    }
}

/// One expiry's worth of helpers.
#[derive(Debug, Clone)]
struct SliceHelpers {
    expiry: f64,
    rate: f64,
    quotes: Vec<(f64, OptionType)>,
    market_prices: Vec<f64>,
    market_vols: Vec<f64>,
}

/// Fits [`HestonParams`] to one or more expiry slices of a [`VolSurface`].
#[derive(Debug, Clone)]
pub struct HestonCalibrator {
    config: HestonCalibratorConfig,
    pricer: HestonFourierPricer,
}

impl HestonCalibrator {
    /// Creates a calibrator.
    pub fn new(config: HestonCalibratorConfig) -> Result<Self, CalibrationError> {
        let pricer = HestonFourierPricer::new(config.fourier)?;
        Ok(Self { config, pricer })
    }

    /// Settings in use.
    pub fn config(&self) -> &HestonCalibratorConfig {
        &self.config
    }

    /// Forward model used for the fit.
    pub fn pricer(&self) -> &HestonFourierPricer {
        &self.pricer
    }

    /// Calibrates against the slices of `surface` at `expiries`.
    ///
    /// Reaching the iteration cap is not an error: the outcome carries
    /// `converged = false` and the last iterate. Use
    /// [`CalibrationOutcome::ensure_converged`] to make it fatal.
    ///
    /// # Errors
    ///
    /// - `UnknownExpiry` for an expiry missing from the surface
    /// - `InsufficientData` with fewer quotes than parameters
    /// - `InvalidQuote` when a market vol cannot be priced
    /// - `Model`, `Pricing` or `Solver` when the initial guess cannot be evaluated
    pub fn calibrate(
        &self,
        market: &MarketState,
        surface: &VolSurface,
        expiries: &[Date],
        initial: &HestonParams,
    ) -> Result<CalibrationOutcome, CalibrationError> {
        initial.validate()?;
        let slices = expiries
            .iter()
            .map(|&expiry| self.build_slice(market, surface, expiry))
            .collect::<Result<Vec<_>, _>>()?;

        let n_quotes: usize = slices.iter().map(|s| s.quotes.len()).sum();
        if n_quotes < N_PARAMS {
            return Err(CalibrationError::InsufficientData {
                required: N_PARAMS,
                provided: n_quotes,
            });
        }

        // Surface the forward model's error at the start point directly.
        for slice in &slices {
            self.slice_residuals(market, slice, initial)?;
        }

        debug!(
            n_slices = slices.len(),
            n_quotes,
            error_type = %self.config.error_type,
            "starting Heston calibration"
        );

        let objective = |y: &[f64]| -> Vec<f64> {
            let params = from_unconstrained(y);
            let per_slice: Result<Vec<Vec<f64>>, CalibrationError> = slices
                .par_iter()
                .map(|slice| self.slice_residuals(market, slice, &params))
                .collect();
            match per_slice {
                Ok(residuals) => {
                    let flat: Vec<f64> = residuals.into_iter().flatten().collect();
                    trace!(?params, ss = flat.iter().map(|r| r * r).sum::<f64>(), "objective");
                    flat
                }
                Err(err) => {
                    trace!(?params, %err, "objective evaluation failed");
                    vec![f64::NAN; n_quotes]
                }
            }
        };

        let solver = LevenbergMarquardtSolver::new(self.config.lm);
        let result = solver.solve(objective, to_unconstrained(initial).to_vec())?;

        let params = from_unconstrained(&result.params);
        let outcome = CalibrationOutcome {
            params,
            converged: result.converged,
            iterations: result.iterations,
            rmse: result.rmse(n_quotes),
            n_quotes,
            stop_reason: result.stop_reason,
        };

        if outcome.converged {
            info!(
                v0 = params.v0,
                kappa = params.kappa,
                theta = params.theta,
                sigma = params.sigma,
                rho = params.rho,
                iterations = outcome.iterations,
                rmse = outcome.rmse,
                "Heston calibration converged"
            );
        } else {
            warn!(
                iterations = outcome.iterations,
                rmse = outcome.rmse,
                stop_reason = ?outcome.stop_reason,
                "Heston calibration did not converge; returning last iterate"
            );
        }
        Ok(outcome)
    }

    /// Market prices and OTM types for one expiry.
    fn build_slice(
        &self,
        market: &MarketState,
        surface: &VolSurface,
        expiry_date: Date,
    ) -> Result<SliceHelpers, CalibrationError> {
        let slice = surface
            .expiry_index(expiry_date)
            .and_then(|i| surface.slice(i))
            .ok_or(CalibrationError::UnknownExpiry(expiry_date))?;
        let expiry = market.time_to(expiry_date)?;
        let rate = market.rate(expiry)?;
        let spot = market.spot();
        let dividend = market.dividend_rate();

        let mut helpers = SliceHelpers {
            expiry,
            rate,
            quotes: Vec::with_capacity(slice.strikes.len()),
            market_prices: Vec::with_capacity(slice.strikes.len()),
            market_vols: Vec::with_capacity(slice.strikes.len()),
        };
        for (strike, vol) in slice.quotes() {
            let option_type = otm_option_type(spot, strike, expiry, rate, dividend);
            let price = black_scholes_price(option_type, spot, strike, expiry, rate, dividend, vol)
                .map_err(|e| CalibrationError::InvalidQuote {
                    strike,
                    message: e.to_string(),
                })?;
            if price <= 0.0 {
                return Err(CalibrationError::InvalidQuote {
                    strike,
                    message: format!("vol {vol} gives a zero price"),
                });
            }
            helpers.quotes.push((strike, option_type));
            helpers.market_prices.push(price);
            helpers.market_vols.push(vol);
        }
        debug!(
            expiry = %expiry_date,
            t = expiry,
            rate,
            n_quotes = helpers.quotes.len(),
            "calibration slice"
        );
        Ok(helpers)
    }

    fn slice_residuals(
        &self,
        market: &MarketState,
        slice: &SliceHelpers,
        params: &HestonParams,
    ) -> Result<Vec<f64>, CalibrationError> {
        let spot = market.spot();
        let dividend = market.dividend_rate();
        let model = self.pricer.price_with_rates(
            params,
            spot,
            slice.expiry,
            slice.rate,
            dividend,
            &slice.quotes,
        )?;

        let residuals = model
            .iter()
            .zip(&slice.market_prices)
            .zip(&slice.market_vols)
            .zip(&slice.quotes)
            .map(|(((&model_price, &market_price), &market_vol), &(strike, option_type))| {
                match self.config.error_type {
                    CalibrationErrorType::Price => model_price - market_price,
                    CalibrationErrorType::RelativePrice => (model_price - market_price) / market_price,
                    CalibrationErrorType::ImpliedVol => implied_volatility(
                        option_type,
                        model_price,
                        spot,
                        strike,
                        slice.expiry,
                        slice.rate,
                        dividend,
                    )
                    .map(|vol| vol - market_vol)
                    .unwrap_or_else(|_| {
                        // First-order fallback when the model price sits on an arbitrage bound.
                        BlackScholes::new(spot, slice.rate, dividend, market_vol)
                            .map(|bs| (model_price - market_price) / bs.vega(strike, slice.expiry))
                            .unwrap_or(f64::NAN)
                    }),
                }
            })
            .collect();
        Ok(residuals)
    }
}
