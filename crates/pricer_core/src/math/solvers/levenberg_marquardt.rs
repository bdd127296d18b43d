//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λI) δ = -Jᵀr
//! ```
//!
//! with a forward-difference Jacobian `J`, accepts the trial point when it
//! lowers the sum of squared residuals and adapts `λ` accordingly.
//!
//! # Stopping rules
//!
//! The solver reports `converged = true` when any of:
//! - the residual norm is below `tolerance`
//! - the gradient `Jᵀr` has max-norm below `gradient_tolerance`
//! - a trial step changes the parameters by less than `param_tolerance`
//!   (relative) *and* the cost by less than `function_tolerance` (relative)
//!
//! It stops with `converged = false`, returning the best iterate so far,
//! once `max_iterations` trial steps have been taken or
//! `max_stationary_iterations` consecutive steps were rejected.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Fit y = a * exp(-b * x)
//! let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let ys: Vec<f64> = xs.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
//!
//! let residuals = |p: &[f64]| -> Vec<f64> {
//!     xs.iter().zip(&ys).map(|(x, y)| p[0] * (-p[1] * x).exp() - y).collect()
//! };
//!
//! let solver = LevenbergMarquardtSolver::new(LMConfig::default());
//! let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-5);
//! ```

use crate::types::SolverError;

/// Levenberg-Marquardt configuration.
///
/// Defaults follow the usual end criteria for model calibration: 500
/// iterations, 50 stationary iterations, relative tolerances of 1e-8.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMConfig {
    /// Absolute residual-norm threshold treated as an exact fit.
    pub tolerance: f64,
    /// Maximum number of trial steps.
    pub max_iterations: usize,
    /// Maximum consecutive rejected steps.
    pub max_stationary_iterations: usize,
    /// Relative parameter-change tolerance.
    pub param_tolerance: f64,
    /// Relative cost-change tolerance.
    pub function_tolerance: f64,
    /// Max-norm tolerance on the gradient `Jᵀr`.
    pub gradient_tolerance: f64,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Damping multiplier after a rejected step.
    pub lambda_up: f64,
    /// Damping multiplier after an accepted step.
    pub lambda_down: f64,
    /// Damping floor.
    pub min_lambda: f64,
    /// Damping ceiling.
    pub max_lambda: f64,
    /// Relative bump for the forward-difference Jacobian.
    pub jacobian_step: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 500,
            max_stationary_iterations: 50,
            param_tolerance: 1e-8,
            function_tolerance: 1e-8,
            gradient_tolerance: 1e-8,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
            jacobian_step: 1e-8,
        }
    }
}

impl LMConfig {
    /// Configuration with explicit end criteria; damping settings default.
    pub fn with_end_criteria(
        max_iterations: usize,
        max_stationary_iterations: usize,
        param_tolerance: f64,
        function_tolerance: f64,
        gradient_tolerance: f64,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_iterations,
            param_tolerance,
            function_tolerance,
            gradient_tolerance,
            ..Default::default()
        }
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Residual norm below `tolerance`.
    ZeroResidual,
    /// Gradient max-norm below `gradient_tolerance`.
    SmallGradient,
    /// Parameter and cost changes both below tolerance.
    SmallStep,
    /// `max_iterations` reached.
    MaxIterations,
    /// `max_stationary_iterations` consecutive rejections.
    Stationary,
}

impl StopReason {
    /// True for the converged outcomes.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            StopReason::ZeroResidual | StopReason::SmallGradient | StopReason::SmallStep
        )
    }
}

/// Result of a Levenberg-Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Best parameters found.
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`.
    pub residual_ss: f64,
    /// Trial steps taken.
    pub iterations: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
    /// Damping factor at exit.
    pub final_lambda: f64,
    /// Stopping rule that fired.
    pub stop_reason: StopReason,
}

impl LMResult {
    /// Root mean square residual over `n_observations`.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// Levenberg-Marquardt solver.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Minimises `Σ rᵢ(p)²` from `initial_params`.
    ///
    /// Trial points with non-finite residuals are rejected like any other
    /// step that fails to lower the cost.
    ///
    /// # Errors
    ///
    /// `SolverError::NumericalInstability` if the parameter or residual
    /// vector is empty, or the residuals at `initial_params` are not finite.
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let cfg = &self.config;
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::NumericalInstability(
                "Empty parameter vector".to_string(),
            ));
        }

        let mut params = initial_params;
        let mut r = residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty residual vector".to_string(),
            ));
        }
        if r.iter().any(|x| !x.is_finite()) {
            return Err(SolverError::NumericalInstability(
                "Non-finite residual at initial parameters".to_string(),
            ));
        }

        let mut ss = sum_of_squares(&r);
        let mut lambda = cfg.initial_lambda;
        let mut stationary = 0usize;
        let mut jacobian = compute_jacobian(&residuals, &params, &r, cfg.jacobian_step);
        let mut iteration = 0usize;

        let finish = |params, ss, iterations, lambda, reason: StopReason| LMResult {
            params,
            residual_ss: ss,
            iterations,
            converged: reason.is_converged(),
            final_lambda: lambda,
            stop_reason: reason,
        };

        while iteration < cfg.max_iterations {
            if ss.sqrt() < cfg.tolerance {
                return Ok(finish(params, ss, iteration, lambda, StopReason::ZeroResidual));
            }

            let (jtj, gradient) = normal_equations(&jacobian, &r, n_params);
            let gradient_norm = gradient.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
            if gradient_norm < cfg.gradient_tolerance {
                return Ok(finish(params, ss, iteration, lambda, StopReason::SmallGradient));
            }

            iteration += 1;

            let mut damped = jtj;
            for (i, row) in damped.iter_mut().enumerate() {
                row[i] += lambda;
            }
            let rhs: Vec<f64> = gradient.iter().map(|g| -g).collect();

            let Some(delta) = solve_cholesky(&damped, &rhs) else {
                lambda = (lambda * cfg.lambda_up).min(cfg.max_lambda);
                stationary += 1;
                if stationary >= cfg.max_stationary_iterations {
                    return Ok(finish(params, ss, iteration, lambda, StopReason::Stationary));
                }
                continue;
            };

            let trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let trial_r = residuals(&trial);
            let trial_ss = if trial_r.len() == r.len() && trial_r.iter().all(|x| x.is_finite()) {
                sum_of_squares(&trial_r)
            } else {
                f64::INFINITY
            };

            let step_norm = norm(&delta);
            let param_change = step_norm / (norm(&params) + cfg.param_tolerance);
            let cost_change = (ss - trial_ss).abs() / ss.max(f64::MIN_POSITIVE);
            let small_step =
                param_change < cfg.param_tolerance && cost_change < cfg.function_tolerance;

            if trial_ss < ss {
                params = trial;
                r = trial_r;
                ss = trial_ss;
                lambda = (lambda * cfg.lambda_down).max(cfg.min_lambda);
                stationary = 0;
                if small_step {
                    return Ok(finish(params, ss, iteration, lambda, StopReason::SmallStep));
                }
                jacobian = compute_jacobian(&residuals, &params, &r, cfg.jacobian_step);
            } else {
                if small_step {
                    return Ok(finish(params, ss, iteration, lambda, StopReason::SmallStep));
                }
                lambda = (lambda * cfg.lambda_up).min(cfg.max_lambda);
                stationary += 1;
                if stationary >= cfg.max_stationary_iterations {
                    return Ok(finish(params, ss, iteration, lambda, StopReason::Stationary));
                }
            }
        }

        Ok(finish(params, ss, iteration, lambda, StopReason::MaxIterations))
    }
}

/// Forward-difference Jacobian, `jacobian[i][j] = ∂rᵢ/∂pⱼ`.
fn compute_jacobian<F>(residuals: &F, params: &[f64], r0: &[f64], eps: f64) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n_params = params.len();
    let n_residuals = r0.len();
    let mut jacobian = vec![vec![0.0; n_params]; n_residuals];

    for j in 0..n_params {
        let h = eps * params[j].abs().max(1.0);
        let mut bumped = params.to_vec();
        bumped[j] += h;
        let r_plus = residuals(&bumped);

        for i in 0..n_residuals {
            let d = r_plus.get(i).map_or(f64::NAN, |rp| (rp - r0[i]) / h);
            // A non-finite column entry would poison the normal equations.
            jacobian[i][j] = if d.is_finite() { d } else { 0.0 };
        }
    }

    jacobian
}

/// Returns `(JᵀJ, Jᵀr)`.
fn normal_equations(jacobian: &[Vec<f64>], r: &[f64], n_params: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut jtj = vec![vec![0.0; n_params]; n_params];
    let mut jtr = vec![0.0; n_params];

    for (row, &ri) in jacobian.iter().zip(r) {
        for i in 0..n_params {
            jtr[i] += row[i] * ri;
            for j in 0..=i {
                jtj[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n_params {
        for j in 0..i {
            jtj[j][i] = jtj[i][j];
        }
    }

    (jtj, jtr)
}

#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

#[inline]
fn norm(v: &[f64]) -> f64 {
    sum_of_squares(v).sqrt()
}

/// Solves `A x = b` for symmetric positive definite `A`.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}
