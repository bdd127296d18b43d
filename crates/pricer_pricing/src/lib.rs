//! # Pricer Pricing (L3: Simulation and Session API)
//!
//! Monte Carlo engine, payoff evaluators and the session-level pricing API
//! built on the Heston model of `pricer_models`.
//!
//! This crate provides:
//! - [`rng::PricerRng`]: seeded generator with per-block streams
//! - [`mc::HestonPathSimulator`]: full-truncation Euler paths on a daily grid
//! - [`evaluators`]: vanilla (Fourier), digital and down-and-out barrier NPVs
//! - [`session::PricingSession`]: calibrate once, price many requests
//! - [`PricingError`]: the error taxonomy seen by callers
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::types::Date;
//! use pricer_models::instruments::OptionType;
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::session::{MarketSnapshot, PricingSession, SessionSettings};
//!
//! let snapshot = MarketSnapshot::btc_2021_11_22().unwrap();
//! let market = snapshot.market_state().unwrap();
//! let session = PricingSession::new(SessionSettings::default()).unwrap();
//!
//! let params = HestonParams::new(0.7, 2.5, 0.75, 1.5, 0.1).unwrap();
//! let maturity = Date::from_ymd(2022, 12, 31).unwrap();
//! let call = session
//!     .price_vanilla(&market, &params, maturity, 60_000.0, OptionType::Call)
//!     .unwrap();
//! assert!(call > 0.0 && call < market.spot());
//! ```
//!
//! ## Concurrency
//!
//! Everything here is immutable after construction. Path generation is split
//! across rayon workers in fixed-size blocks with their own generators, and
//! payoffs are reduced with order-independent sums and counts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod evaluators;
pub mod mc;
pub mod rng;
pub mod session;

pub use error::PricingError;
