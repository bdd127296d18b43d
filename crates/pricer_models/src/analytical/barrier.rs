//! Continuously monitored down-and-out options under Black-Scholes.
//!
//! Closed form of Reiner and Rubinstein (1991) with zero rebate, in the
//! notation of Haug, *The Complete Guide to Option Pricing Formulas*:
//!
//! - μ = (b - σ²/2) / σ², with cost of carry b = r - q
//! - A, B: vanilla-like terms at the strike and at the barrier
//! - C, D: their reflections through the barrier
//!
//! | Payoff | K > H       | K ≤ H |
//! |--------|-------------|-------|
//! | call   | A - C       | B - D |
//! | put    | A - B + C - D | 0   |
//!
//! The simulated barrier monitors discretely, which only knocks out less
//! often, so this price is a lower bound the Monte Carlo estimate
//! approaches as the step shrinks.

use super::distributions::norm_cdf;
use super::error::AnalyticalError;
use crate::instruments::OptionType;

/// Down-and-out price with continuous monitoring and no rebate.
///
/// Returns 0 when the spot is already at or below the barrier.
///
/// # Errors
///
/// Non-positive volatility, strike, barrier or expiry.
///
/// # Examples
///
/// ```
/// use pricer_models::analytical::{black_scholes_price, down_and_out_barrier_price};
/// use pricer_models::instruments::OptionType;
///
/// let vanilla = black_scholes_price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.0, 0.2).unwrap();
/// let knocked = down_and_out_barrier_price(OptionType::Call, 100.0, 100.0, 80.0, 1.0, 0.05, 0.0, 0.2).unwrap();
/// assert!(knocked < vanilla);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn down_and_out_barrier_price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    barrier: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
) -> Result<f64, AnalyticalError> {
    if !volatility.is_finite() || volatility <= 0.0 {
        return Err(AnalyticalError::InvalidVolatility { volatility });
    }
    if !strike.is_finite() || strike <= 0.0 {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !barrier.is_finite() || barrier <= 0.0 {
        return Err(AnalyticalError::InvalidConfig(format!(
            "barrier must be positive, got {barrier}"
        )));
    }
    if !expiry.is_finite() || expiry <= 0.0 {
        return Err(AnalyticalError::InvalidExpiry { expiry });
    }
    if spot <= barrier {
        return Ok(0.0);
    }

    let terms = ReinerRubinstein::new(spot, barrier, expiry, rate, dividend, volatility);
    let price = match option_type {
        OptionType::Call => {
            if strike > barrier {
                terms.a(1.0, strike) - terms.c(1.0, strike)
            } else {
                terms.b(1.0, strike) - terms.d(1.0, strike)
            }
        }
        OptionType::Put => {
            if strike > barrier {
                terms.a(-1.0, strike) - terms.b(-1.0, strike) + terms.c(-1.0, strike)
                    - terms.d(-1.0, strike)
            } else {
                0.0
            }
        }
    };
    Ok(price.max(0.0))
}

/// Building blocks shared by the down-and-out cases (η = +1).
struct ReinerRubinstein {
    spot: f64,
    barrier: f64,
    vol_sqrt_t: f64,
    mu: f64,
    spot_pv: f64,
    discount: f64,
    log_spot_over_barrier: f64,
}

impl ReinerRubinstein {
    fn new(spot: f64, barrier: f64, expiry: f64, rate: f64, dividend: f64, volatility: f64) -> Self {
        let variance = volatility * volatility;
        let carry = rate - dividend;
        Self {
            spot,
            barrier,
            vol_sqrt_t: volatility * expiry.sqrt(),
            mu: (carry - 0.5 * variance) / variance,
            spot_pv: spot * (-dividend * expiry).exp(),
            discount: (-rate * expiry).exp(),
            log_spot_over_barrier: (spot / barrier).ln(),
        }
    }

    fn shift(&self) -> f64 {
        (1.0 + self.mu) * self.vol_sqrt_t
    }

    fn vanilla_term(&self, phi: f64, strike: f64, x: f64) -> f64 {
        phi * self.spot_pv * norm_cdf(phi * x)
            - phi * strike * self.discount * norm_cdf(phi * (x - self.vol_sqrt_t))
    }

    fn reflected_term(&self, phi: f64, strike: f64, y: f64) -> f64 {
        let ratio = self.barrier / self.spot;
        phi * self.spot_pv * ratio.powf(2.0 * (self.mu + 1.0)) * norm_cdf(y)
            - phi * strike * self.discount * ratio.powf(2.0 * self.mu) * norm_cdf(y - self.vol_sqrt_t)
    }

    fn a(&self, phi: f64, strike: f64) -> f64 {
        let x1 = (self.spot / strike).ln() / self.vol_sqrt_t + self.shift();
        self.vanilla_term(phi, strike, x1)
    }

    fn b(&self, phi: f64, strike: f64) -> f64 {
        let x2 = self.log_spot_over_barrier / self.vol_sqrt_t + self.shift();
        self.vanilla_term(phi, strike, x2)
    }

    fn c(&self, phi: f64, strike: f64) -> f64 {
        let y1 = (self.barrier * self.barrier / (self.spot * strike)).ln() / self.vol_sqrt_t
            + self.shift();
        self.reflected_term(phi, strike, y1)
    }

    fn d(&self, phi: f64, strike: f64) -> f64 {
        let y2 = -self.log_spot_over_barrier / self.vol_sqrt_t + self.shift();
        self.reflected_term(phi, strike, y2)
    }
}
