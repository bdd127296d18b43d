//! Monte Carlo estimate with its standard error.

use rayon::prelude::*;

/// Sample mean of a payoff, scaled by a discount factor.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::McEstimate;
///
/// let estimate = McEstimate { value: 0.42, std_error: 0.01, n_paths: 20_000 };
/// println!("NPV: {} +/- {}", estimate.value, estimate.confidence_95());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McEstimate {
    /// Estimated present value
    pub value: f64,
    /// Standard error of `value`
    pub std_error: f64,
    /// Number of paths averaged
    pub n_paths: usize,
}

impl McEstimate {
    /// Mean and standard error of `samples`, both multiplied by `scale`.
    ///
    /// The mean divides by the number of samples, so zero payoffs (for
    /// example knocked-out paths) still count.
    pub fn from_samples<I>(samples: I, scale: f64) -> Self
    where
        I: ParallelIterator<Item = f64>,
    {
        let (n, sum, sum_sq) = samples
            .map(|x| (1usize, x, x * x))
            .reduce(|| (0, 0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));
        Self::from_moments(n, sum, sum_sq, scale)
    }

    /// Estimate from path count, payoff sum and sum of squares.
    pub fn from_moments(n_paths: usize, sum: f64, sum_sq: f64, scale: f64) -> Self {
        if n_paths == 0 {
            return Self {
                value: 0.0,
                std_error: 0.0,
                n_paths,
            };
        }
        let n = n_paths as f64;
        let mean = sum / n;
        let variance = if n_paths > 1 {
            ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };
        Self {
            value: mean * scale,
            std_error: (variance / n).sqrt() * scale.abs(),
            n_paths,
        }
    }

    /// Half-width of the 95% confidence interval.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Half-width of the 99% confidence interval.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }
}
