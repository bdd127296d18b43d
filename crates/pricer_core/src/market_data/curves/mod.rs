//! Interest rate term structures.
//!
//! - [`YieldCurve`]: zero rate and discount factor at a year fraction
//! - [`ZeroCurve`]: dated zero-rate pillars, linear in rate over time
//! - [`Compounding`]: rate quotation for reporting

mod compounding;
mod traits;
mod zero;

pub use compounding::Compounding;
pub use traits::YieldCurve;
pub use zero::{CurvePoint, ZeroCurve};
