//! Gauss-Legendre quadrature.
//!
//! Nodes and weights are computed once on the reference interval `[-1, 1]`
//! by Newton iteration on the Legendre polynomial `P_n`, then mapped onto
//! any finite `[a, b]`. An `n`-point rule integrates polynomials of degree
//! `2n - 1` exactly.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::quadrature::GaussLegendre;
//!
//! let rule = GaussLegendre::new(16).unwrap();
//! let area = rule.integrate(0.0, std::f64::consts::PI, |x| x.sin());
//! assert!((area - 2.0).abs() < 1e-12);
//! ```

use crate::types::SolverError;
use std::f64::consts::PI;

const NEWTON_TOLERANCE: f64 = 1e-14;
const NEWTON_MAX_ITERATIONS: usize = 100;

/// An `n`-point Gauss-Legendre rule on `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Builds the `n`-point rule.
    ///
    /// # Errors
    ///
    /// `SolverError::NumericalInstability` for `n == 0`;
    /// `SolverError::MaxIterationsExceeded` if a root refuses to converge.
    pub fn new(n: usize) -> Result<Self, SolverError> {
        if n == 0 {
            return Err(SolverError::NumericalInstability(
                "Gauss-Legendre rule needs at least one node".to_string(),
            ));
        }

        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];
        let nf = n as f64;

        // Roots are symmetric; solve for the positive half only.
        for i in 0..n.div_ceil(2) {
            let mut x = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
            let mut converged = false;

            for _ in 0..NEWTON_MAX_ITERATIONS {
                let (p, dp) = legendre_with_derivative(n, x);
                let dx = p / dp;
                x -= dx;
                if dx.abs() < NEWTON_TOLERANCE {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(SolverError::MaxIterationsExceeded {
                    iterations: NEWTON_MAX_ITERATIONS,
                });
            }
            let (_, derivative) = legendre_with_derivative(n, x);

            let w = 2.0 / ((1.0 - x * x) * derivative * derivative);
            nodes[i] = -x;
            nodes[n - 1 - i] = x;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Ok(Self { nodes, weights })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a rule has at least one node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reference nodes on `[-1, 1]`, ascending.
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Reference weights, summing to 2.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Iterates `(x, w)` pairs mapped onto `[a, b]`.
    pub fn mapped(&self, a: f64, b: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let half = 0.5 * (b - a);
        let mid = 0.5 * (b + a);
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(move |(&x, &w)| (mid + half * x, half * w))
    }

    /// Approximates `∫_a^b f(x) dx`.
    pub fn integrate<F>(&self, a: f64, b: f64, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.mapped(a, b).map(|(x, w)| w * f(x)).sum()
    }
}

/// `(P_n(x), P_n'(x))` via the three-term recurrence.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let (pn, pn_1) = if n == 1 { (x, 1.0) } else { (p1, p0) };
    let dp = n as f64 * (x * pn - pn_1) / (x * x - 1.0);
    (pn, dp)
}
