//! Payoff evaluators.
//!
//! | Product | Method | Output |
//! |---------|--------|--------|
//! | [`VanillaEvaluator`] | characteristic-function pricer | `f64` |
//! | [`DigitalEvaluator`] | indicator payoff on simulated terminal spots | [`McEstimate`](crate::mc::McEstimate) |
//! | [`BarrierEvaluator`] | knock-out monitoring on the daily grid | [`McEstimate`](crate::mc::McEstimate) |
//!
//! Evaluators hold configuration only. Each call simulates fresh paths and
//! discards them afterwards.

mod barrier;
mod digital;
mod vanilla;

pub use barrier::{barrier_estimate, BarrierEvaluator};
pub use digital::{digital_estimate, DigitalEvaluator};
pub use vanilla::VanillaEvaluator;
