//! Heston stochastic volatility model parameters.
//!
//! Under the risk-neutral measure:
//!
//! ```text
//! dS = (r - q) S dt + sqrt(v) S dW_S
//! dv = kappa (theta - v) dt + sigma sqrt(v) dW_v
//! E[dW_S dW_v] = rho dt
//! ```
//!
//! ## Feller condition
//!
//! The variance stays strictly positive when `2 kappa theta > sigma²`.
//! It is reported, not enforced; calibrated BTC parameters routinely
//! violate it.
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::HestonParams;
//!
//! let params = HestonParams::new(0.01, 0.2, 0.02, 0.5, -0.75).unwrap();
//! assert!(!params.satisfies_feller());
//! assert!(HestonParams::new(0.01, 0.2, 0.02, 0.5, -1.5).is_err());
//! ```

use thiserror::Error;

/// Heston parameter validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HestonError {
    /// Initial variance must be non-negative.
    #[error("Invalid initial variance: v0 = {0} (must be >= 0)")]
    InvalidV0(f64),

    /// Mean-reversion speed must be positive.
    #[error("Invalid mean reversion speed: kappa = {0} (must be > 0)")]
    InvalidKappa(f64),

    /// Long-run variance must be non-negative.
    #[error("Invalid long-run variance: theta = {0} (must be >= 0)")]
    InvalidTheta(f64),

    /// Vol-of-vol must be positive.
    #[error("Invalid vol-of-vol: sigma = {0} (must be > 0)")]
    InvalidSigma(f64),

    /// Correlation must lie in [-1, 1].
    #[error("Invalid correlation: rho = {0} (must be in [-1, 1])")]
    InvalidRho(f64),
}

/// The five Heston parameters.
///
/// Produced once per session by calibration and shared read-only by every
/// pricer afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// Initial variance
    pub v0: f64,
    /// Mean reversion speed
    pub kappa: f64,
    /// Long-run variance
    pub theta: f64,
    /// Volatility of variance
    pub sigma: f64,
    /// Spot/variance correlation
    pub rho: f64,
}

impl HestonParams {
    /// Creates validated parameters.
    ///
    /// # Errors
    ///
    /// Returns the [`HestonError`] variant of the first violated bound.
    pub fn new(v0: f64, kappa: f64, theta: f64, sigma: f64, rho: f64) -> Result<Self, HestonError> {
        let params = Self {
            v0,
            kappa,
            theta,
            sigma,
            rho,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks `v0 >= 0`, `kappa > 0`, `theta >= 0`, `sigma > 0`,
    /// `rho ∈ [-1, 1]`, all finite.
    pub fn validate(&self) -> Result<(), HestonError> {
        if !self.v0.is_finite() || self.v0 < 0.0 {
            return Err(HestonError::InvalidV0(self.v0));
        }
        if !self.kappa.is_finite() || self.kappa <= 0.0 {
            return Err(HestonError::InvalidKappa(self.kappa));
        }
        if !self.theta.is_finite() || self.theta < 0.0 {
            return Err(HestonError::InvalidTheta(self.theta));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(HestonError::InvalidSigma(self.sigma));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(HestonError::InvalidRho(self.rho));
        }
        Ok(())
    }

    /// `2 kappa theta / sigma²`; above 1 the variance cannot reach zero.
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }

    /// Whether the Feller condition holds.
    pub fn satisfies_feller(&self) -> bool {
        self.feller_ratio() > 1.0
    }

    /// Expected average variance over `[0, t]`.
    ///
    /// Useful as a Black-Scholes proxy volatility: `sqrt(mean_variance(t))`.
    pub fn mean_variance(&self, t: f64) -> f64 {
        let kt = self.kappa * t;
        if kt < 1e-8 {
            return self.v0;
        }
        self.theta + (self.v0 - self.theta) * (1.0 - (-kt).exp()) / kt
    }
}

impl Default for HestonParams {
    /// Fixed starting point used when no prior calibration exists.
    fn default() -> Self {
        Self {
            v0: 0.01,
            kappa: 0.2,
            theta: 0.02,
            sigma: 0.5,
            rho: -0.75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_params() {
        let p = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
        assert_eq!(p.v0, 0.04);
        assert!(p.satisfies_feller());
        assert_relative_eq!(p.feller_ratio(), 2.0 * 1.5 * 0.04 / 0.09);
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(HestonParams::new(0.0, 1.0, 0.0, 0.1, -1.0).is_ok());
        assert!(HestonParams::new(0.0, 1.0, 0.0, 0.1, 1.0).is_ok());
    }

    #[test]
    fn test_invalid_params() {
        assert_eq!(
            HestonParams::new(-0.01, 1.0, 0.04, 0.3, 0.0),
            Err(HestonError::InvalidV0(-0.01))
        );
        assert_eq!(
            HestonParams::new(0.04, 0.0, 0.04, 0.3, 0.0),
            Err(HestonError::InvalidKappa(0.0))
        );
        assert_eq!(
            HestonParams::new(0.04, 1.0, -0.04, 0.3, 0.0),
            Err(HestonError::InvalidTheta(-0.04))
        );
        assert_eq!(
            HestonParams::new(0.04, 1.0, 0.04, 0.0, 0.0),
            Err(HestonError::InvalidSigma(0.0))
        );
        assert_eq!(
            HestonParams::new(0.04, 1.0, 0.04, 0.3, 1.01),
            Err(HestonError::InvalidRho(1.01))
        );
        assert!(HestonParams::new(f64::NAN, 1.0, 0.04, 0.3, 0.0).is_err());
        assert!(HestonParams::new(0.04, 1.0, 0.04, 0.3, f64::NAN).is_err());
    }

    #[test]
    fn test_default_is_valid_initial_guess() {
        let p = HestonParams::default();
        assert!(p.validate().is_ok());
        assert_eq!((p.v0, p.kappa, p.theta, p.rho, p.sigma), (0.01, 0.2, 0.02, -0.75, 0.5));
    }

    #[test]
    fn test_mean_variance_limits() {
        let p = HestonParams::new(0.09, 2.0, 0.04, 0.3, 0.0).unwrap();
        assert_relative_eq!(p.mean_variance(0.0), 0.09);
        assert!(p.mean_variance(1.0) < 0.09 && p.mean_variance(1.0) > 0.04);
        assert_relative_eq!(p.mean_variance(1e4), 0.04, epsilon = 1e-4);
    }
}
