//! Cash-or-nothing digital valuation by simulation.
//!
//! The payoff is `1` when the terminal spot finishes strictly in the money
//! (`S_T > K` for a call, `S_T < K` for a put). By default the average is
//! reported at maturity without discounting; set `discount` to
//! present-value it with `D(T)`.

use crate::error::PricingError;
use crate::mc::{HestonPathSimulator, McEstimate, SimulatedPaths};
use pricer_core::types::Date;
use pricer_models::instruments::{OptionTerms, OptionType};
use pricer_models::market::MarketState;
use pricer_models::models::HestonParams;
use rayon::prelude::*;
use tracing::{debug, warn};

/// Indicator average over terminal spots, times `scale`.
pub fn digital_estimate(
    paths: &SimulatedPaths,
    strike: f64,
    option_type: OptionType,
    scale: f64,
) -> McEstimate {
    let last = paths.n_steps();
    let hits = paths
        .par_paths()
        .filter(|path| option_type.is_in_the_money(path[last], strike))
        .count();
    // Indicator samples: sum and sum of squares coincide.
    let hits = hits as f64;
    McEstimate::from_moments(paths.n_paths(), hits, hits, scale)
}

/// Digital option evaluator.
#[derive(Debug, Clone)]
pub struct DigitalEvaluator {
    simulator: HestonPathSimulator,
    discount: bool,
}

impl DigitalEvaluator {
    /// Creates an evaluator; `discount = false` reports the undiscounted average.
    pub fn new(simulator: HestonPathSimulator, discount: bool) -> Self {
        if !discount {
            warn!("digital payoff is reported at maturity without discounting");
        }
        Self {
            simulator,
            discount,
        }
    }

    /// Path simulator in use.
    pub fn simulator(&self) -> &HestonPathSimulator {
        &self.simulator
    }

    /// Whether the payoff is discounted.
    pub fn discounts(&self) -> bool {
        self.discount
    }

    /// NPV of a digital paying 1 at `maturity`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a non-positive strike or an expired maturity
    /// - `InvalidSimulationParameters` for a bad path configuration
    pub fn npv(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
        strike: f64,
        option_type: OptionType,
    ) -> Result<McEstimate, PricingError> {
        OptionTerms::new(maturity, strike, option_type)?;
        let paths = self.simulator.simulate(market, params, maturity)?;
        let scale = if self.discount {
            market.discount(market.time_to(maturity)?)?
        } else {
            1.0
        };
        let estimate = digital_estimate(&paths, strike, option_type, scale);
        debug!(
            %maturity,
            strike,
            %option_type,
            n_paths = estimate.n_paths,
            npv = estimate.value,
            std_error = estimate.std_error,
            "digital priced"
        );
        Ok(estimate)
    }
}
