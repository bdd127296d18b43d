//! Core time and error types.
//!
//! - `time`: [`Date`] and [`DayCountConvention`] for year-fraction arithmetic
//! - `error`: [`DateError`], [`InterpolationError`] and [`SolverError`]

pub mod error;
pub mod time;

pub use error::{DateError, InterpolationError, SolverError};
pub use time::{Date, DayCountConvention};
