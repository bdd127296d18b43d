//! # pricer_core: Foundation for the BTC Heston pricer
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace and provides:
//! - Time types: [`types::Date`], [`types::DayCountConvention`]
//! - Error types: [`types::DateError`], [`types::InterpolationError`], [`types::SolverError`]
//! - Numerics: complex arithmetic, Gauss-Legendre quadrature, linear
//!   interpolation, Brent and Levenberg-Marquardt solvers (`math`)
//! - Market data: the dated [`market_data::ZeroCurve`] and the
//!   [`market_data::VolSurface`] calibration input (`market_data`)
//!
//! Layer 1 has no dependencies on other pricer_* crates and performs no I/O.
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::market_data::{YieldCurve, ZeroCurve};
//! use pricer_core::types::{Date, DayCountConvention};
//!
//! let valuation = Date::from_ymd(2021, 11, 22).unwrap();
//! let curve = ZeroCurve::flat(valuation, 0.001, DayCountConvention::Actual365Fixed).unwrap();
//!
//! let expiry = Date::from_ymd(2022, 3, 25).unwrap();
//! let t = curve.year_fraction(expiry);
//! let df = curve.discount_factor(t).unwrap();
//! assert!(df < 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialisation for `Date`, `DayCountConvention`,
//!   `Compounding` and `CurvePoint`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
