//! European vanilla valuation through the Fourier pricer.

use crate::error::PricingError;
use pricer_core::types::Date;
use pricer_models::analytical::{FourierConfig, HestonFourierPricer};
use pricer_models::instruments::OptionType;
use pricer_models::market::MarketState;
use pricer_models::models::HestonParams;

/// Vanilla call/put NPV, no simulation.
#[derive(Debug, Clone)]
pub struct VanillaEvaluator {
    pricer: HestonFourierPricer,
}

impl VanillaEvaluator {
    /// Creates an evaluator with the given quadrature settings.
    pub fn new(config: FourierConfig) -> Result<Self, PricingError> {
        Ok(Self {
            pricer: HestonFourierPricer::new(config)?,
        })
    }

    /// Wraps an existing pricer.
    pub fn from_pricer(pricer: HestonFourierPricer) -> Self {
        Self { pricer }
    }

    /// Underlying Fourier pricer.
    pub fn pricer(&self) -> &HestonFourierPricer {
        &self.pricer
    }

    /// Present value of one option.
    pub fn npv(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
        strike: f64,
        option_type: OptionType,
    ) -> Result<f64, PricingError> {
        Ok(self
            .pricer
            .price(params, market, maturity, strike, option_type)?)
    }

    /// Present values of several `(strike, type)` pairs on one maturity.
    pub fn npv_strikes(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
        quotes: &[(f64, OptionType)],
    ) -> Result<Vec<f64>, PricingError> {
        Ok(self
            .pricer
            .price_strikes(params, market, maturity, quotes)?)
    }
}
