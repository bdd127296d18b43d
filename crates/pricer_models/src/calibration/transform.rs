//! Unconstrained parameterisation of the Heston parameters.
//!
//! The optimiser works on `y ∈ ℝ⁵`:
//!
//! | param | map          |
//! |-------|--------------|
//! | v0    | `exp(y0)`    |
//! | kappa | `exp(y1)`    |
//! | theta | `exp(y2)`    |
//! | sigma | `exp(y3)`    |
//! | rho   | `tanh(y4)`   |
//!
//! Every `y` maps to an admissible parameter set, so no step of the
//! optimiser can leave the feasible region.

use crate::models::HestonParams;

/// Number of free parameters.
pub const N_PARAMS: usize = 5;

/// Positive parameters are floored here before taking logarithms.
const MIN_POSITIVE: f64 = 1e-12;

/// Correlation is pulled inside the open interval before `atanh`.
const MAX_ABS_RHO: f64 = 1.0 - 1e-12;

/// Maps admissible parameters to the optimiser's coordinates.
pub fn to_unconstrained(params: &HestonParams) -> [f64; N_PARAMS] {
    [
        params.v0.max(MIN_POSITIVE).ln(),
        params.kappa.max(MIN_POSITIVE).ln(),
        params.theta.max(MIN_POSITIVE).ln(),
        params.sigma.max(MIN_POSITIVE).ln(),
        params.rho.clamp(-MAX_ABS_RHO, MAX_ABS_RHO).atanh(),
    ]
}

/// Maps optimiser coordinates back to parameters.
///
/// Overflowing coordinates produce infinite parameters, which the pricer
/// rejects and the optimiser treats as a failed trial.
pub fn from_unconstrained(y: &[f64]) -> HestonParams {
    let at = |i: usize| y.get(i).copied().unwrap_or(f64::NAN);
    HestonParams {
        v0: at(0).exp(),
        kappa: at(1).exp(),
        theta: at(2).exp(),
        sigma: at(3).exp(),
        rho: at(4).tanh(),
    }
}
