//! Market data: rate term structures and implied volatility surfaces.
//!
//! - [`curves`]: the [`YieldCurve`] trait and the dated [`ZeroCurve`]
//! - [`surfaces`]: the expiry × strike [`VolSurface`] calibration input
//! - [`error`]: [`MarketDataError`]
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::{YieldCurve, ZeroCurve};
//! use pricer_core::types::{Date, DayCountConvention};
//!
//! let valuation = Date::from_ymd(2021, 11, 22).unwrap();
//! let pillars = vec![
//!     (valuation, 0.01),
//!     (Date::from_ymd(2022, 11, 22).unwrap(), 0.02),
//! ];
//! let curve = ZeroCurve::new(valuation, pillars, DayCountConvention::Actual365Fixed).unwrap();
//! assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
//! assert!((curve.zero_rate(0.5).unwrap() - 0.015).abs() < 1e-12);
//! ```

pub mod curves;
pub mod error;
pub mod surfaces;

pub use curves::{Compounding, CurvePoint, YieldCurve, ZeroCurve};
pub use error::MarketDataError;
pub use surfaces::{VolSlice, VolSurface};
