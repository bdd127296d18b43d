//! Closed-form and semi-analytic pricing.
//!
//! - [`HestonFourierPricer`]: Heston vanillas by characteristic-function inversion
//! - [`BlackScholes`]: reference prices and implied-volatility inversion
//! - [`down_and_out_barrier_price`]: continuously monitored barrier under Black-Scholes

pub mod barrier;
pub mod black_scholes;
pub mod distributions;
pub mod error;
pub mod heston_fourier;

pub use barrier::down_and_out_barrier_price;
pub use black_scholes::{black_scholes_price, implied_volatility, otm_option_type, BlackScholes};
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use heston_fourier::{FourierConfig, HestonFourierPricer};
