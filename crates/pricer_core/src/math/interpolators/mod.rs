//! One-dimensional interpolation.
//!
//! - [`LinearInterpolator`]: piecewise-linear with flat extrapolation
//!
//! Interpolators implement the [`Interpolator`] trait and are generic over
//! `T: Float`.

mod linear;

pub use linear::LinearInterpolator;

use num_traits::Float;

/// Common interface for 1D interpolators.
pub trait Interpolator<T: Float> {
    /// Value at `x`.
    fn interpolate(&self, x: T) -> T;

    /// `(x_min, x_max)` of the knot set.
    fn domain(&self) -> (T, T);
}
