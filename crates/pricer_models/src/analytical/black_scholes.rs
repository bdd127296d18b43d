//! Black-Scholes pricing for European options with a continuous dividend yield.
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! Used to turn quoted implied volatilities into prices for calibration,
//! to invert model prices back to volatilities, and as the limiting case
//! the Heston pricers are checked against.

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use crate::instruments::OptionType;
use pricer_core::math::solvers::{BrentSolver, SolverConfig};

/// Expiries below this are priced at intrinsic value.
const EXPIRY_EPSILON: f64 = 1e-10;

/// Volatility search interval for implied-volatility inversion.
const IMPLIED_VOL_BRACKET: (f64, f64) = (1e-6, 10.0);

/// Black-Scholes model with flat rate and dividend yield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes {
    spot: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
}

impl BlackScholes {
    /// Creates a Black-Scholes model.
    ///
    /// # Errors
    ///
    /// `InvalidVolatility` unless `volatility` is positive and finite.
    /// Spot is validated by the caller's market state.
    pub fn new(spot: f64, rate: f64, dividend: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !volatility.is_finite() || volatility <= 0.0 {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self {
            spot,
            rate,
            dividend,
            volatility,
        })
    }

    /// Spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// d₁ term.
    #[inline]
    pub fn d1(&self, strike: f64, expiry: f64) -> f64 {
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let drift = (self.rate - self.dividend + 0.5 * self.volatility * self.volatility) * expiry;
        ((self.spot / strike).ln() + drift) / vol_sqrt_t
    }

    /// d₂ = d₁ - σ√T.
    #[inline]
    pub fn d2(&self, strike: f64, expiry: f64) -> f64 {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// Option price. At (or numerically at) expiry returns intrinsic value.
    pub fn price(&self, option_type: OptionType, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return option_type.intrinsic(self.spot, strike);
        }
        let d1 = self.d1(strike, expiry);
        let d2 = d1 - self.volatility * expiry.sqrt();
        let spot_pv = self.spot * (-self.dividend * expiry).exp();
        let strike_pv = strike * (-self.rate * expiry).exp();

        match option_type {
            OptionType::Call => spot_pv * norm_cdf(d1) - strike_pv * norm_cdf(d2),
            OptionType::Put => strike_pv * norm_cdf(-d2) - spot_pv * norm_cdf(-d1),
        }
    }

    /// Vega = S·e^(-qT)·φ(d₁)·√T, identical for calls and puts.
    pub fn vega(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return 0.0;
        }
        let d1 = self.d1(strike, expiry);
        self.spot * (-self.dividend * expiry).exp() * norm_pdf(d1) * expiry.sqrt()
    }
}

/// Black-Scholes price of a European option.
///
/// # Errors
///
/// `InvalidVolatility` for a non-positive volatility, `InvalidStrike` for a
/// non-positive strike.
///
/// # Examples
///
/// ```
/// use pricer_models::analytical::black_scholes_price;
/// use pricer_models::instruments::OptionType;
///
/// let call = black_scholes_price(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.0, 0.2).unwrap();
/// assert!((call - 10.450_583_572_185_565).abs() < 1e-9);
/// ```
pub fn black_scholes_price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
) -> Result<f64, AnalyticalError> {
    validate_strike(strike)?;
    Ok(BlackScholes::new(spot, rate, dividend, volatility)?.price(option_type, strike, expiry))
}

/// Implied Black-Scholes volatility of `price`, found with Brent's method.
///
/// # Errors
///
/// `ImpliedVolatility` when the price violates the no-arbitrage bounds
/// `[intrinsic forward value, S·e^(-qT)]` (calls) or the root search fails.
pub fn implied_volatility(
    option_type: OptionType,
    price: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
) -> Result<f64, AnalyticalError> {
    validate_strike(strike)?;
    if !expiry.is_finite() || expiry <= EXPIRY_EPSILON {
        return Err(AnalyticalError::InvalidExpiry { expiry });
    }

    let spot_pv = spot * (-dividend * expiry).exp();
    let strike_pv = strike * (-rate * expiry).exp();
    let (lower, upper) = match option_type {
        OptionType::Call => ((spot_pv - strike_pv).max(0.0), spot_pv),
        OptionType::Put => ((strike_pv - spot_pv).max(0.0), strike_pv),
    };
    if !price.is_finite() || price <= lower || price >= upper {
        return Err(AnalyticalError::ImpliedVolatility {
            message: format!("price {price} outside no-arbitrage bounds ({lower}, {upper})"),
        });
    }

    let objective = |vol: f64| {
        BlackScholes {
            spot,
            rate,
            dividend,
            volatility: vol,
        }
        .price(option_type, strike, expiry)
            - price
    };
    let solver = BrentSolver::new(SolverConfig::new(1e-12, 200));
    let (lo, hi) = IMPLIED_VOL_BRACKET;
    Ok(solver.find_root(objective, lo, hi)?)
}

/// Out-of-the-money side for a quote: call when `K·e^(-rT) ≥ S·e^(-qT)`,
/// put otherwise.
pub fn otm_option_type(spot: f64, strike: f64, expiry: f64, rate: f64, dividend: f64) -> OptionType {
    let strike_pv = strike * (-rate * expiry).exp();
    let spot_pv = spot * (-dividend * expiry).exp();
    if strike_pv >= spot_pv {
        OptionType::Call
    } else {
        OptionType::Put
    }
}

fn validate_strike(strike: f64) -> Result<(), AnalyticalError> {
    if !strike.is_finite() || strike <= 0.0 {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    Ok(())
}
