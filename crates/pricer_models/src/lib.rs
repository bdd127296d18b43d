//! # Pricer Models (L2: Business Logic)
//!
//! Heston model, market state, option specifications, analytical pricers
//! and calibration.
//!
//! This crate provides:
//! - [`models::HestonParams`]: the five Heston parameters and their bounds
//! - [`market::MarketState`]: valuation date, spot, dividend yield and rate curve
//! - [`instruments::OptionSpec`]: vanilla, digital and barrier requests
//! - [`analytical`]: characteristic-function Heston pricer and Black-Scholes references
//! - [`calibration`]: Levenberg-Marquardt fit to an implied-volatility surface
//!
//! ## Design Principles
//!
//! - **Explicit valuation date** carried by the market state, never global
//! - **Pure pricers**: no shared mutable state, safe to call from many threads
//! - **Enum-based instruments** for static dispatch

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod calibration;
pub mod instruments;
pub mod market;
pub mod models;
