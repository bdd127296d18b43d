//! Numerical building blocks.
//!
//! - [`complex`]: complex arithmetic for characteristic functions
//! - [`quadrature`]: Gauss-Legendre integration rules
//! - [`interpolators`]: 1D interpolation
//! - [`solvers`]: Brent root finding and Levenberg-Marquardt least squares

pub mod complex;
pub mod interpolators;
pub mod quadrature;
pub mod solvers;
