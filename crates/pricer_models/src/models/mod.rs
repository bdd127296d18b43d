//! Stochastic models.
//!
//! - [`heston`]: Heston stochastic volatility parameters

pub mod heston;

pub use heston::{HestonError, HestonParams};
