//! Monte Carlo engine for the Heston model.
//!
//! # Architecture
//!
//! ```text
//! HestonPathSimulator
//! ├── MonteCarloConfig  (paths, seed, drift, block size)
//! ├── PricerRng         (one generator per block of paths)
//! └── SimulatedPaths    (row-major spot grid, consumed once)
//!         │
//!         ▼
//!     payoff evaluators ──► McEstimate { value, std_error }
//! ```
//!
//! ```rust
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::mc::{HestonPathSimulator, McEstimate, MonteCarloConfig};
//! use rayon::prelude::*;
//!
//! let config = MonteCarloConfig::builder().n_paths(1_000).seed(42).build().unwrap();
//! let simulator = HestonPathSimulator::new(config).unwrap();
//! let params = HestonParams::new(0.04, 2.0, 0.04, 0.3, -0.5).unwrap();
//! let paths = simulator.simulate_steps(100.0, 0.0, &params, 30, 1_000).unwrap();
//!
//! let estimate = McEstimate::from_samples(paths.par_paths().map(|p| p[30]), 1.0);
//! assert!((estimate.value - 100.0).abs() < 5.0 * estimate.std_error);
//! ```

mod config;
mod error;
mod estimate;
mod paths;

pub use config::{
    Drift, MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_CHUNK_SIZE, DEFAULT_PATHS,
    MAX_PATHS, MAX_STEPS,
};
pub use error::SimulationError;
pub use estimate::McEstimate;
pub use paths::{HestonPathSimulator, SimulatedPaths, DAILY_DT, MAX_SAMPLES};
