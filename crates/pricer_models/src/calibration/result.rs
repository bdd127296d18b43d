//! Calibration outcome and report.

use super::error::CalibrationError;
use crate::market::MarketState;
use crate::models::HestonParams;
use pricer_core::math::solvers::StopReason;
use pricer_core::types::Date;

/// Result of a calibration run.
///
/// Non-convergence is reported in-band through `converged`; the parameters
/// are the last iterate either way.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOutcome {
    /// Fitted (or last) parameters
    pub params: HestonParams,
    /// Whether a convergence criterion was met
    pub converged: bool,
    /// Optimiser iterations
    pub iterations: usize,
    /// Root mean square of the calibration residuals
    pub rmse: f64,
    /// Number of quotes fitted
    pub n_quotes: usize,
    /// Stopping rule that fired
    pub stop_reason: StopReason,
}

impl CalibrationOutcome {
    /// Parameters, or `DidNotConverge` carrying them.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::solvers::StopReason;
    /// use pricer_models::calibration::CalibrationOutcome;
    /// use pricer_models::models::HestonParams;
    ///
    /// let outcome = CalibrationOutcome {
    ///     params: HestonParams::default(),
    ///     converged: false,
    ///     iterations: 500,
    ///     rmse: 0.02,
    ///     n_quotes: 9,
    ///     stop_reason: StopReason::MaxIterations,
    /// };
    /// let err = outcome.ensure_converged().unwrap_err();
    /// assert_eq!(err.last_iterate(), Some(&HestonParams::default()));
    /// ```
    pub fn ensure_converged(self) -> Result<HestonParams, CalibrationError> {
        if self.converged {
            Ok(self.params)
        } else {
            Err(CalibrationError::DidNotConverge {
                params: self.params,
                iterations: self.iterations,
                rmse: self.rmse,
            })
        }
    }

    /// Flat summary for display or serialisation.
    pub fn report(&self, market: &MarketState) -> CalibrationReport {
        CalibrationReport {
            valuation_date: market.valuation_date(),
            spot: market.spot(),
            v0: self.params.v0,
            kappa: self.params.kappa,
            theta: self.params.theta,
            sigma: self.params.sigma,
            rho: self.params.rho,
            converged: self.converged,
            iterations: self.iterations,
            rmse: self.rmse,
        }
    }
}

/// Calibration summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationReport {
    /// Valuation date
    pub valuation_date: Date,
    /// Spot at calibration
    pub spot: f64,
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
    /// Convergence flag
    pub converged: bool,
    /// Optimiser iterations
    pub iterations: usize,
    /// Root mean square residual
    pub rmse: f64,
}

impl CalibrationReport {
    /// Parameters carried by the report.
    pub fn params(&self) -> HestonParams {
        HestonParams {
            v0: self.v0,
            kappa: self.kappa,
            theta: self.theta,
            sigma: self.sigma,
            rho: self.rho,
        }
    }
}
