//! Root-finding and least-squares solvers.
//!
//! - [`BrentSolver`]: bracketing root finder (implied volatility inversion)
//! - [`LevenbergMarquardtSolver`]: damped Gauss-Newton for model calibration
//!
//! ```
//! use pricer_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Minimise (p[0] - 2)² + (p[1] - 3)²
//! let residuals = |p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0];
//!
//! let solver = LevenbergMarquardtSolver::new(LMConfig::default());
//! let result = solver.solve(residuals, vec![0.0, 0.0]).unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! ```

mod brent;
mod config;
mod levenberg_marquardt;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver, StopReason};
