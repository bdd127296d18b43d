//! Error types for the foundation layer.
//!
//! - `DateError`: date construction and parsing failures
//! - `InterpolationError`: invalid interpolation input
//! - `SolverError`: root-finding and least-squares failures

use thiserror::Error;

/// Date-related errors.
///
/// # Examples
/// ```
/// use pricer_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    #[error("Invalid date: {year}-{month}-{day}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse a date string.
    #[error("Date parse error: {0}")]
    ParseError(String),

    /// Date arithmetic left the representable calendar.
    #[error("Date out of range: {date} + {days} days")]
    OutOfRange {
        /// Starting date (ISO 8601)
        date: String,
        /// Day offset applied
        days: i64,
    },
}

/// Interpolation-related errors.
///
/// # Examples
/// ```
/// use pricer_core::types::InterpolationError;
///
/// let err = InterpolationError::InsufficientData { got: 1, need: 2 };
/// assert!(format!("{}", err).contains("got 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// Not enough knots to build an interpolator.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Abscissae are not strictly increasing.
    #[error("Data is not monotonic at index {index}")]
    NonMonotonicData {
        /// Index where monotonicity violation was detected
        index: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Solver errors.
///
/// Shared by the Brent root finder and the Levenberg-Marquardt
/// least-squares solver.
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Objective produced a non-finite value or the problem is degenerate.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_error_display() {
        let err = DateError::ParseError("bad".to_string());
        assert_eq!(format!("{}", err), "Date parse error: bad");
    }

    #[test]
    fn test_interpolation_error_display() {
        let err = InterpolationError::NonMonotonicData { index: 3 };
        assert_eq!(format!("{}", err), "Data is not monotonic at index 3");
    }

    #[test]
    fn test_solver_error_display() {
        let err = SolverError::NoBracket { a: 0.0, b: 1.0 };
        assert_eq!(format!("{}", err), "No bracket: f(0) and f(1) have same sign");

        let err = SolverError::NumericalInstability("NaN residual".to_string());
        assert!(format!("{}", err).contains("NaN residual"));
    }

    #[test]
    fn test_errors_are_std_errors() {
        let _: &dyn std::error::Error = &DateError::ParseError(String::new());
        let _: &dyn std::error::Error = &SolverError::MaxIterationsExceeded { iterations: 1 };
    }
}
