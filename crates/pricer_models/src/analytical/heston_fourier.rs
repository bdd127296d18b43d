//! Semi-analytic Heston pricing by Gil-Pelaez inversion.
//!
//! The European call is
//!
//! ```text
//! C = S·e^(-qT)·P1 - K·e^(-rT)·P2
//! Pj = 1/2 + 1/π ∫₀^∞ Re[e^(iu·x) ψj(u) / (iu)] du,   x = ln(F/K)
//! ```
//!
//! where ψ is the characteristic function of `ln(S_T/F)`, `ψ2(u) = ψ(u)`
//! and `ψ1(u) = ψ(u - i)`. Puts follow from put-call parity.
//!
//! ψ uses the "little trap" form of Albrecher et al. (2007), which keeps
//! the complex logarithm on its principal branch for long maturities.
//! The `ln` term is evaluated with `ln(1 + w)` so the formula stays
//! accurate as the vol-of-vol goes to zero and the model collapses to
//! Black-Scholes.
//!
//! # Numerical scheme
//!
//! 1. Truncation: starting from `U = 1`, `U` doubles until the integrand
//!    envelope `max(|ψ1(U)|, |ψ2(U)|) / U` falls below
//!    [`FourierConfig::truncation_tolerance`].
//! 2. Quadrature: Gauss-Legendre on `[0, U]` with
//!    [`FourierConfig::initial_nodes`] nodes, doubling until successive
//!    estimates of every `Pj` agree within
//!    [`FourierConfig::convergence_tolerance`].
//!
//! ψ is evaluated once per node and shared by every strike of a slice.

use super::error::AnalyticalError;
use crate::instruments::OptionType;
use crate::market::MarketState;
use crate::models::HestonParams;
use pricer_core::math::complex::Complex64;
use pricer_core::math::quadrature::GaussLegendre;
use pricer_core::types::Date;
use std::f64::consts::PI;

/// Quadrature and truncation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FourierConfig {
    /// Gauss-Legendre nodes of the first attempt
    pub initial_nodes: usize,
    /// Largest node count tried before giving up
    pub max_nodes: usize,
    /// Integrand magnitude at which the domain is cut
    pub truncation_tolerance: f64,
    /// Agreement required between successive node counts
    pub convergence_tolerance: f64,
    /// Largest admissible truncation point
    pub max_truncation: f64,
}

impl Default for FourierConfig {
    fn default() -> Self {
        Self {
            initial_nodes: 64,
            max_nodes: 1024,
            truncation_tolerance: 1e-10,
            convergence_tolerance: 1e-9,
            max_truncation: 1e5,
        }
    }
}

impl FourierConfig {
    /// Checks the settings are usable.
    ///
    /// At least two node counts must fit in `[initial_nodes, max_nodes]`
    /// so convergence can be assessed.
    pub fn validate(&self) -> Result<(), AnalyticalError> {
        if self.initial_nodes < 2 {
            return Err(AnalyticalError::InvalidConfig(format!(
                "initial_nodes must be at least 2, got {}",
                self.initial_nodes
            )));
        }
        if self.max_nodes < 2 * self.initial_nodes {
            return Err(AnalyticalError::InvalidConfig(format!(
                "max_nodes ({}) must be at least twice initial_nodes ({})",
                self.max_nodes, self.initial_nodes
            )));
        }
        for (name, value) in [
            ("truncation_tolerance", self.truncation_tolerance),
            ("convergence_tolerance", self.convergence_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalyticalError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.max_truncation.is_finite() || self.max_truncation < 1.0 {
            return Err(AnalyticalError::InvalidConfig(format!(
                "max_truncation must be at least 1, got {}",
                self.max_truncation
            )));
        }
        Ok(())
    }
}

/// Heston characteristic-function pricer for European vanillas.
///
/// Holds precomputed quadrature rules only; every call is a pure function
/// of its arguments, so one instance can be shared across threads.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::ZeroCurve;
/// use pricer_core::types::{Date, DayCountConvention};
/// use pricer_models::analytical::{FourierConfig, HestonFourierPricer};
/// use pricer_models::instruments::OptionType;
/// use pricer_models::market::MarketState;
/// use pricer_models::models::HestonParams;
///
/// let valuation = Date::from_ymd(2021, 11, 22).unwrap();
/// let curve = ZeroCurve::flat(valuation, 0.001, DayCountConvention::Actual365Fixed).unwrap();
/// let market = MarketState::new(valuation, 57_407.27, 0.0, curve).unwrap();
/// let params = HestonParams::new(0.6, 2.0, 0.5, 0.9, -0.2).unwrap();
///
/// let pricer = HestonFourierPricer::new(FourierConfig::default()).unwrap();
/// let maturity = Date::from_ymd(2022, 3, 25).unwrap();
/// let call = pricer.price(&params, &market, maturity, 60_000.0, OptionType::Call).unwrap();
/// assert!(call > 0.0 && call < 57_407.27);
/// ```
#[derive(Debug, Clone)]
pub struct HestonFourierPricer {
    config: FourierConfig,
    rules: Vec<GaussLegendre>,
}

impl HestonFourierPricer {
    /// Builds the pricer, precomputing one rule per node count.
    pub fn new(config: FourierConfig) -> Result<Self, AnalyticalError> {
        config.validate()?;
        let mut rules = Vec::new();
        let mut nodes = config.initial_nodes;
        while nodes <= config.max_nodes {
            let rule = GaussLegendre::new(nodes)
                .map_err(|e| AnalyticalError::InvalidConfig(e.to_string()))?;
            rules.push(rule);
            nodes *= 2;
        }
        Ok(Self { config, rules })
    }

    /// Settings in use.
    pub fn config(&self) -> &FourierConfig {
        &self.config
    }

    /// Present value of one European option.
    ///
    /// # Errors
    ///
    /// - `Market` if the maturity is not after the valuation date
    /// - `Model` for out-of-range parameters
    /// - `NumericalIntegration` if the integrand is not finite or the
    ///   quadrature does not converge within `max_nodes`
    pub fn price(
        &self,
        params: &HestonParams,
        market: &MarketState,
        maturity: Date,
        strike: f64,
        option_type: OptionType,
    ) -> Result<f64, AnalyticalError> {
        let prices = self.price_strikes(params, market, maturity, &[(strike, option_type)])?;
        prices
            .into_iter()
            .next()
            .ok_or_else(|| AnalyticalError::InvalidConfig("empty price vector".to_string()))
    }

    /// Prices several `(strike, type)` pairs sharing one maturity.
    pub fn price_strikes(
        &self,
        params: &HestonParams,
        market: &MarketState,
        maturity: Date,
        quotes: &[(f64, OptionType)],
    ) -> Result<Vec<f64>, AnalyticalError> {
        let expiry = market.time_to(maturity)?;
        let rate = market.rate(expiry)?;
        self.price_with_rates(
            params,
            market.spot(),
            expiry,
            rate,
            market.dividend_rate(),
            quotes,
        )
    }

    /// Prices against explicit flat rates and a year-fraction expiry.
    pub fn price_with_rates(
        &self,
        params: &HestonParams,
        spot: f64,
        expiry: f64,
        rate: f64,
        dividend: f64,
        quotes: &[(f64, OptionType)],
    ) -> Result<Vec<f64>, AnalyticalError> {
        params.validate()?;
        if !expiry.is_finite() || expiry <= 0.0 {
            return Err(AnalyticalError::InvalidExpiry { expiry });
        }
        if let Some(&(strike, _)) = quotes.iter().find(|(k, _)| !k.is_finite() || *k <= 0.0) {
            return Err(AnalyticalError::InvalidStrike { strike });
        }

        let forward = spot * ((rate - dividend) * expiry).exp();
        let log_moneyness: Vec<f64> = quotes.iter().map(|(k, _)| (forward / k).ln()).collect();
        let probabilities = self.probabilities(params, expiry, &log_moneyness)?;

        let spot_pv = spot * (-dividend * expiry).exp();
        let discount = (-rate * expiry).exp();
        Ok(quotes
            .iter()
            .zip(probabilities)
            .map(|(&(strike, option_type), (p1, p2))| {
                let strike_pv = strike * discount;
                let call = spot_pv * p1 - strike_pv * p2;
                let price = match option_type {
                    OptionType::Call => call,
                    OptionType::Put => call - spot_pv + strike_pv,
                };
                price.max(option_type.intrinsic(spot_pv, strike_pv))
            })
            .collect())
    }

    /// `(P1, P2)` for each log-moneyness.
    fn probabilities(
        &self,
        params: &HestonParams,
        expiry: f64,
        log_moneyness: &[f64],
    ) -> Result<Vec<(f64, f64)>, AnalyticalError> {
        let cf = CharacteristicFunction::new(params, expiry);
        let upper = self.truncation(&cf)?;

        let mut previous: Option<Vec<(f64, f64)>> = None;
        for rule in &self.rules {
            let current = integrate(rule, upper, &cf, log_moneyness)?;
            if let Some(prev) = &previous {
                let change = prev
                    .iter()
                    .zip(&current)
                    .map(|(a, b)| (a.0 - b.0).abs().max((a.1 - b.1).abs()))
                    .fold(0.0, f64::max);
                if change <= self.config.convergence_tolerance * PI {
                    return Ok(current
                        .into_iter()
                        .map(|(i1, i2)| {
                            (
                                (0.5 + i1 / PI).clamp(0.0, 1.0),
                                (0.5 + i2 / PI).clamp(0.0, 1.0),
                            )
                        })
                        .collect());
                }
            }
            previous = Some(current);
        }

        Err(AnalyticalError::NumericalIntegration {
            message: format!(
                "no agreement within {:e} using up to {} nodes on [0, {upper}]",
                self.config.convergence_tolerance, self.config.max_nodes
            ),
        })
    }

    /// Smallest power-of-two `U` where the integrand envelope is negligible.
    fn truncation(&self, cf: &CharacteristicFunction) -> Result<f64, AnalyticalError> {
        let mut upper = 1.0;
        loop {
            let envelope = cf
                .eval(Complex64::real(upper))
                .norm()
                .max(cf.eval(Complex64::new(upper, -1.0)).norm())
                / upper;
            if !envelope.is_finite() {
                return Err(AnalyticalError::NumericalIntegration {
                    message: format!("characteristic function not finite at u = {upper}"),
                });
            }
            if envelope < self.config.truncation_tolerance {
                return Ok(upper);
            }
            upper *= 2.0;
            if upper > self.config.max_truncation {
                return Err(AnalyticalError::NumericalIntegration {
                    message: format!(
                        "integrand envelope {envelope:e} above tolerance at truncation cap {}",
                        self.config.max_truncation
                    ),
                });
            }
        }
    }
}

/// Raw integrals `∫₀^U Re[e^(iux) ψj(u) / (iu)] du` for every `x`.
fn integrate(
    rule: &GaussLegendre,
    upper: f64,
    cf: &CharacteristicFunction,
    log_moneyness: &[f64],
) -> Result<Vec<(f64, f64)>, AnalyticalError> {
    let mut sums = vec![(0.0, 0.0); log_moneyness.len()];
    for (u, w) in rule.mapped(0.0, upper) {
        let psi1 = cf.eval(Complex64::new(u, -1.0));
        let psi2 = cf.eval(Complex64::real(u));
        if !psi1.is_finite() || !psi2.is_finite() {
            return Err(AnalyticalError::NumericalIntegration {
                message: format!("integrand not finite at u = {u}"),
            });
        }
        let scale = w / u;
        for (sum, &x) in sums.iter_mut().zip(log_moneyness) {
            let (sin, cos) = (u * x).sin_cos();
            // Re[(cos + i sin)·ψ / (iu)] = Im[(cos + i sin)·ψ] / u
            sum.0 += scale * (sin * psi1.re + cos * psi1.im);
            sum.1 += scale * (sin * psi2.re + cos * psi2.im);
        }
    }
    Ok(sums)
}

/// ψ(u) = E[exp(iu·ln(S_T/F))] under Heston dynamics.
struct CharacteristicFunction {
    v0: f64,
    kappa: f64,
    theta: f64,
    sigma: f64,
    rho: f64,
    expiry: f64,
}

impl CharacteristicFunction {
    fn new(params: &HestonParams, expiry: f64) -> Self {
        Self {
            v0: params.v0,
            kappa: params.kappa,
            theta: params.theta,
            sigma: params.sigma,
            rho: params.rho,
            expiry,
        }
    }

    fn eval(&self, u: Complex64) -> Complex64 {
        let sigma2 = self.sigma * self.sigma;
        let iu = Complex64::I * u;
        let quadratic = u * u + iu;

        let xi = Complex64::real(self.kappa) - iu * (self.sigma * self.rho);
        let d = (xi * xi + quadratic * sigma2).sqrt();
        let xi_plus_d = xi + d;

        // (ξ - d)/σ² without cancellation
        let r_minus = -quadratic / xi_plus_d;
        let g = r_minus * sigma2 / xi_plus_d;
        let decay = (-(d * self.expiry)).exp();
        let one_minus_decay = 1.0 - decay;

        let variance_coeff = r_minus * one_minus_decay / (1.0 - g * decay);

        // ln((1 - g·e)/(1 - g)) = ln(1 + w), w = g(1 - e)/(1 - g)
        let w = g * one_minus_decay / (1.0 - g);
        let log_term = w.ln_1p() * (2.0 / sigma2);
        let drift_coeff = (r_minus * self.expiry - log_term) * (self.kappa * self.theta);

        (drift_coeff + variance_coeff * self.v0).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::black_scholes_price;
    use approx::assert_relative_eq;

    fn pricer() -> HestonFourierPricer {
        HestonFourierPricer::new(FourierConfig::default()).unwrap()
    }

    fn btc_params() -> HestonParams {
        HestonParams::new(0.64, 1.8, 0.55, 1.1, -0.15).unwrap()
    }

    fn price(params: &HestonParams, strike: f64, expiry: f64, option_type: OptionType) -> f64 {
        pricer()
            .price_with_rates(params, 100.0, expiry, 0.03, 0.01, &[(strike, option_type)])
            .unwrap()[0]
    }

    // ========================================
    // Characteristic Function
    // ========================================

    #[test]
    fn test_cf_martingale_normalisation() {
        let cf = CharacteristicFunction::new(&btc_params(), 0.7);
        let at_zero = cf.eval(Complex64::real(0.0));
        let at_minus_i = cf.eval(Complex64::new(0.0, -1.0));
        assert_relative_eq!(at_zero.re, 1.0, epsilon = 1e-14);
        assert_relative_eq!(at_minus_i.re, 1.0, epsilon = 1e-14);
        assert!(at_minus_i.im.abs() < 1e-14);
    }

    #[test]
    fn test_cf_conjugate_symmetry() {
        let cf = CharacteristicFunction::new(&btc_params(), 0.4);
        let plus = cf.eval(Complex64::real(3.7));
        let minus = cf.eval(Complex64::real(-3.7));
        assert_relative_eq!(plus.re, minus.re, epsilon = 1e-14);
        assert_relative_eq!(plus.im, -minus.im, epsilon = 1e-14);
    }

    #[test]
    fn test_cf_bounded_by_one_on_real_axis() {
        let cf = CharacteristicFunction::new(&btc_params(), 2.0);
        for i in 1..200 {
            assert!(cf.eval(Complex64::real(i as f64 * 0.25)).norm() <= 1.0 + 1e-12);
        }
    }

    // ========================================
    // Prices
    // ========================================

    #[test]
    fn test_black_scholes_limit() {
        // Constant variance 0.04 and negligible vol-of-vol.
        let params = HestonParams::new(0.04, 1.5, 0.04, 1e-4, 0.0).unwrap();
        for strike in [80.0, 100.0, 125.0] {
            for option_type in [OptionType::Call, OptionType::Put] {
                let heston = price(&params, strike, 1.0, option_type);
                let bs = black_scholes_price(option_type, 100.0, strike, 1.0, 0.03, 0.01, 0.2).unwrap();
                assert_relative_eq!(heston, bs, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_put_call_parity() {
        let params = btc_params();
        for strike in [70.0, 100.0, 140.0] {
            let call = price(&params, strike, 0.5, OptionType::Call);
            let put = price(&params, strike, 0.5, OptionType::Put);
            let parity = 100.0 * (-0.01_f64 * 0.5).exp() - strike * (-0.03_f64 * 0.5).exp();
            assert_relative_eq!(call - put, parity, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_call_decreasing_and_convex_in_strike() {
        let params = btc_params();
        let quotes: Vec<(f64, OptionType)> = (0..15)
            .map(|i| (60.0 + 6.0 * i as f64, OptionType::Call))
            .collect();
        let prices = pricer()
            .price_with_rates(&params, 100.0, 0.25, 0.03, 0.01, &quotes)
            .unwrap();
        assert!(prices.windows(2).all(|w| w[1] < w[0]));
        assert!(prices.windows(3).all(|w| w[0] - 2.0 * w[1] + w[2] > -1e-9));
    }

    #[test]
    fn test_slice_matches_single_prices() {
        let params = btc_params();
        let quotes = [
            (80.0, OptionType::Put),
            (100.0, OptionType::Call),
            (120.0, OptionType::Call),
        ];
        let slice = pricer()
            .price_with_rates(&params, 100.0, 0.8, 0.03, 0.01, &quotes)
            .unwrap();
        for (&(strike, option_type), batch) in quotes.iter().zip(&slice) {
            assert_relative_eq!(price(&params, strike, 0.8, option_type), *batch, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_tighter_quadrature_agrees() {
        let params = btc_params();
        let fine = HestonFourierPricer::new(FourierConfig {
            max_nodes: 4096,
            convergence_tolerance: 1e-12,
            truncation_tolerance: 1e-14,
            ..FourierConfig::default()
        })
        .unwrap();
        for expiry in [0.02, 0.3, 2.0] {
            let coarse = price(&params, 110.0, expiry, OptionType::Call);
            let reference = fine
                .price_with_rates(&params, 100.0, expiry, 0.03, 0.01, &[(110.0, OptionType::Call)])
                .unwrap()[0];
            assert_relative_eq!(coarse, reference, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_price_through_market_state() {
        use pricer_core::market_data::ZeroCurve;
        use pricer_core::types::DayCountConvention;

        let valuation = Date::from_ymd(2021, 11, 22).unwrap();
        let curve = ZeroCurve::flat(valuation, 0.03, DayCountConvention::Actual365Fixed).unwrap();
        let market = MarketState::new(valuation, 100.0, 0.01, curve).unwrap();
        let maturity = valuation.add_days(365).unwrap();
        let via_market = pricer()
            .price(&btc_params(), &market, maturity, 105.0, OptionType::Call)
            .unwrap();
        assert_relative_eq!(via_market, price(&btc_params(), 105.0, 1.0, OptionType::Call), epsilon = 1e-12);

        let expired = pricer().price(&btc_params(), &market, valuation, 105.0, OptionType::Call);
        assert!(matches!(expired, Err(AnalyticalError::Market(_))));
    }

    // ========================================
    // Failure Modes
    // ========================================

    #[test]
    fn test_truncation_cap_reports_integration_error() {
        let tight = HestonFourierPricer::new(FourierConfig {
            max_truncation: 2.0,
            ..FourierConfig::default()
        })
        .unwrap();
        let params = HestonParams::new(1e-4, 1.0, 1e-4, 0.1, 0.0).unwrap();
        let err = tight
            .price_with_rates(&params, 100.0, 0.01, 0.0, 0.0, &[(100.0, OptionType::Call)])
            .unwrap_err();
        assert!(matches!(err, AnalyticalError::NumericalIntegration { .. }));
    }

    #[test]
    fn test_node_cap_reports_integration_error() {
        let strict = HestonFourierPricer::new(FourierConfig {
            initial_nodes: 2,
            max_nodes: 4,
            ..FourierConfig::default()
        })
        .unwrap();
        let err = strict
            .price_with_rates(&btc_params(), 100.0, 0.5, 0.0, 0.0, &[(130.0, OptionType::Call)])
            .unwrap_err();
        assert!(matches!(err, AnalyticalError::NumericalIntegration { .. }));
    }

    #[test]
    fn test_config_validation() {
        let single_rule = FourierConfig {
            initial_nodes: 64,
            max_nodes: 100,
            ..FourierConfig::default()
        };
        assert!(HestonFourierPricer::new(single_rule).is_err());
        let bad_tol = FourierConfig {
            convergence_tolerance: 0.0,
            ..FourierConfig::default()
        };
        assert!(bad_tol.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_strike_and_params() {
        let p = pricer();
        assert!(matches!(
            p.price_with_rates(&btc_params(), 100.0, 1.0, 0.0, 0.0, &[(0.0, OptionType::Call)]),
            Err(AnalyticalError::InvalidStrike { .. })
        ));
        let bad = HestonParams {
            rho: 1.5,
            ..btc_params()
        };
        assert!(matches!(
            p.price_with_rates(&bad, 100.0, 1.0, 0.0, 0.0, &[(100.0, OptionType::Call)]),
            Err(AnalyticalError::Model(_))
        ));
    }
}
