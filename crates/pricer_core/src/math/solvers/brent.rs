//! Brent's method root-finding solver.
//!
//! Combines bisection, the secant method and inverse quadratic
//! interpolation. Convergence is guaranteed once a sign change is
//! bracketed, which makes it the workhorse for implied-volatility inversion.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Bracketing root finder.
///
/// ```
/// use pricer_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Finds a root of `f` in `[a, b]`.
    ///
    /// # Errors
    ///
    /// - `SolverError::NoBracket` if `f(a)` and `f(b)` share a sign
    /// - `SolverError::NumericalInstability` if `f` returns NaN
    /// - `SolverError::MaxIterationsExceeded` if the cap is reached
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let to_f64 = |x: T| x.to_f64().unwrap_or(f64::NAN);
        let two = T::one() + T::one();
        let half = T::one() / two;
        let three = two + T::one();

        let mut a = a;
        let mut b = b;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa.is_nan() || fb.is_nan() {
            return Err(SolverError::NumericalInstability(
                "objective is NaN at bracket endpoint".to_string(),
            ));
        }
        if fa == T::zero() {
            return Ok(a);
        }
        if fb == T::zero() {
            return Ok(b);
        }
        if (fa > T::zero()) == (fb > T::zero()) {
            return Err(SolverError::NoBracket {
                a: to_f64(a),
                b: to_f64(b),
            });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_iterations {
            // Keep the root between b and c.
            if (fb > T::zero()) == (fc > T::zero()) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = two * T::epsilon() * b.abs() + half * self.config.tolerance;
            let m = half * (c - b);
            if m.abs() <= tol || fb.abs() < self.config.tolerance {
                return Ok(b);
            }

            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    (two * m * s, T::one() - s)
                } else {
                    let q0 = fa / fc;
                    let r = fb / fc;
                    (
                        s * (two * m * q0 * (q0 - r) - (b - a) * (r - T::one())),
                        (q0 - T::one()) * (r - T::one()) * (s - T::one()),
                    )
                };
                if p > T::zero() {
                    q = -q;
                }
                p = p.abs();

                let min1 = three * m * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if two * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = m;
                    e = d;
                }
            } else {
                d = m;
                e = d;
            }

            a = b;
            fa = fb;
            b = if d.abs() > tol {
                b + d
            } else if m > T::zero() {
                b + tol
            } else {
                b - tol
            };
            fb = f(b);
            if fb.is_nan() {
                return Err(SolverError::NumericalInstability(format!(
                    "objective is NaN at x = {}",
                    to_f64(b)
                )));
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // ========================================
    // Root Finding
    // ========================================

    #[test]
    fn test_find_sqrt_2() {
        let solver = BrentSolver::new(SolverConfig::default());
        let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_find_sin_root() {
        let solver = BrentSolver::new(SolverConfig::default());
        let root = solver.find_root(|x: f64| x.sin(), 3.0, 4.0).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::PI, epsilon = 1e-10);
    }

    #[test]
    fn test_steep_monotone_function() {
        // Shape of a vega-scaled price error in volatility.
        let solver = BrentSolver::new(SolverConfig::new(1e-12, 200));
        let f = |x: f64| (x * 5.0).exp() - 3.0;
        let root = solver.find_root(f, 1e-6, 5.0).unwrap();
        assert_abs_diff_eq!(root, 3.0_f64.ln() / 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = BrentSolver::new(SolverConfig::default());
        assert_eq!(solver.find_root(|x: f64| x - 1.0, 1.0, 2.0).unwrap(), 1.0);
    }

    // ========================================
    // Error Paths
    // ========================================

    #[test]
    fn test_no_bracket() {
        let solver = BrentSolver::new(SolverConfig::default());
        let err = solver.find_root(|x: f64| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert_eq!(err, SolverError::NoBracket { a: -1.0, b: 1.0 });
    }

    #[test]
    fn test_nan_objective() {
        let solver = BrentSolver::new(SolverConfig::default());
        let err = solver.find_root(|_x: f64| f64::NAN, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, SolverError::NumericalInstability(_)));
    }

    #[test]
    fn test_iteration_cap() {
        let solver = BrentSolver::new(SolverConfig::new(1e-300, 2));
        let err = solver.find_root(|x: f64| x.powi(3) - 0.3, 0.0, 1.0).unwrap_err();
        assert_eq!(err, SolverError::MaxIterationsExceeded { iterations: 2 });
    }
}
