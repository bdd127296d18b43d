//! Heston path generation.
//!
//! Full-truncation Euler on a daily grid (`dt = 1/365`):
//!
//! ```text
//! v⁺      = max(v[t-1], 0)
//! v[t]    = max(v[t-1] + κ(θ - v[t-1])dt + σ·sqrt(v⁺dt)·Zv, 0)
//! S[t]    = S[t-1] + μ·S[t-1]·dt + sqrt(v⁺dt)·S[t-1]·Zs
//! ```
//!
//! with `corr(Zs, Zv) = ρ`, drawn independently across paths and steps.
//!
//! # Memory Layout
//!
//! Spots are stored row-major: `spots[path_idx * (n_steps + 1) + step_idx]`,
//! where `step_idx = 0` holds the initial spot.
//!
//! # Parallelism
//!
//! Paths are generated in blocks of [`MonteCarloConfig::chunk_size`]; block
//! `i` draws from `PricerRng::for_chunk(seed, i)`, so a seeded run gives the
//! same paths on any number of threads.

use super::config::{Drift, MonteCarloConfig, MAX_PATHS, MAX_STEPS};
use super::error::SimulationError;
use crate::rng::{entropy_seed, PricerRng};
use pricer_core::types::Date;
use pricer_models::market::MarketState;
use pricer_models::models::HestonParams;
use rayon::prelude::*;
use tracing::debug;

/// Simulation time step in years.
pub const DAILY_DT: f64 = 1.0 / 365.0;

/// Upper bound on stored samples (`n_paths · (n_steps + 1)`).
pub const MAX_SAMPLES: usize = 250_000_000;

/// Dense grid of simulated spots.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatedPaths {
    n_paths: usize,
    n_steps: usize,
    dt: f64,
    seed: u64,
    spots: Vec<f64>,
}

impl SimulatedPaths {
    /// Number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps; each path has `n_steps + 1` samples.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Step size in years.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Horizon `n_steps · dt`.
    #[inline]
    pub fn horizon(&self) -> f64 {
        self.n_steps as f64 * self.dt
    }

    /// Base seed the paths were generated from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples of path `idx`, or `None` out of range.
    pub fn path(&self, idx: usize) -> Option<&[f64]> {
        let stride = self.n_steps + 1;
        self.spots.get(idx * stride..(idx + 1) * stride)
    }

    /// Terminal spot of path `idx`.
    pub fn terminal(&self, idx: usize) -> Option<f64> {
        self.path(idx).and_then(|p| p.last().copied())
    }

    /// Iterator over paths.
    pub fn paths(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.spots.chunks_exact(self.n_steps + 1)
    }

    /// Parallel iterator over paths.
    pub fn par_paths(&self) -> impl IndexedParallelIterator<Item = &[f64]> + '_ {
        self.spots.par_chunks_exact(self.n_steps + 1)
    }

    /// Raw row-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.spots
    }
}

/// Correlated spot/variance path generator.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::mc::{HestonPathSimulator, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder().n_paths(256).seed(7).build().unwrap();
/// let simulator = HestonPathSimulator::new(config).unwrap();
/// let params = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
/// let paths = simulator.simulate_steps(100.0, 0.01, &params, 30, 256).unwrap();
/// assert_eq!(paths.n_paths(), 256);
/// assert_eq!(paths.path(0).unwrap().len(), 31);
/// ```
#[derive(Clone, Debug, Default)]
pub struct HestonPathSimulator {
    config: MonteCarloConfig,
}

impl HestonPathSimulator {
    /// Creates a simulator.
    pub fn new(config: MonteCarloConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Settings in use.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Spot drift for a horizon of `t` years under the configured convention.
    pub fn drift_for(&self, market: &MarketState, t: f64) -> Result<f64, SimulationError> {
        Ok(match self.config.drift() {
            Drift::RiskNeutral => market.rate(t)? - market.dividend_rate(),
            Drift::DividendRate => market.dividend_rate(),
        })
    }

    /// Simulates `n_paths` (from the config) paths to `maturity`, one step
    /// per calendar day.
    ///
    /// # Errors
    ///
    /// - `Market` if `maturity` is not after the valuation date
    /// - `InvalidStepCount` beyond [`MAX_STEPS`] days
    /// - `Model` for out-of-range parameters
    pub fn simulate(
        &self,
        market: &MarketState,
        params: &HestonParams,
        maturity: Date,
    ) -> Result<SimulatedPaths, SimulationError> {
        let days = market.days_to(maturity)?;
        let n_steps = usize::try_from(days).map_err(|_| SimulationError::InvalidParameter {
            name: "maturity",
            value: format!("{days} days to maturity"),
        })?;
        let t = market.time_to(maturity)?;
        let drift = self.drift_for(market, t)?;
        self.simulate_steps(market.spot(), drift, params, n_steps, self.config.n_paths())
    }

    /// Simulates `n_paths` paths of `n_steps` daily steps from `spot` with
    /// constant drift `drift`.
    ///
    /// # Errors
    ///
    /// - `InvalidPathCount` / `InvalidStepCount` for zero or excessive counts
    /// - `InvalidParameter` for a non-positive spot, non-finite drift or an
    ///   oversized grid
    /// - `Model` for out-of-range parameters
    pub fn simulate_steps(
        &self,
        spot: f64,
        drift: f64,
        params: &HestonParams,
        n_steps: usize,
        n_paths: usize,
    ) -> Result<SimulatedPaths, SimulationError> {
        if n_paths == 0 || n_paths > MAX_PATHS {
            return Err(SimulationError::InvalidPathCount(n_paths));
        }
        if n_steps == 0 || n_steps > MAX_STEPS {
            return Err(SimulationError::InvalidStepCount(n_steps));
        }
        if !spot.is_finite() || spot <= 0.0 {
            return Err(SimulationError::InvalidParameter {
                name: "spot",
                value: format!("must be positive, got {spot}"),
            });
        }
        if !drift.is_finite() {
            return Err(SimulationError::InvalidParameter {
                name: "drift",
                value: format!("must be finite, got {drift}"),
            });
        }
        params.validate()?;

        let stride = n_steps + 1;
        let n_samples = n_paths
            .checked_mul(stride)
            .filter(|&n| n <= MAX_SAMPLES)
            .ok_or_else(|| SimulationError::InvalidParameter {
                name: "n_paths",
                value: format!("{n_paths} paths x {stride} samples exceeds {MAX_SAMPLES}"),
            })?;

        let seed = self.config.seed().unwrap_or_else(entropy_seed);
        let chunk_size = self.config.chunk_size();
        debug!(
            n_paths,
            n_steps,
            seed,
            drift,
            chunk_size,
            "simulating Heston paths"
        );

        let step = EulerStep::new(params, drift, DAILY_DT);
        let mut spots = vec![0.0; n_samples];
        spots
            .par_chunks_mut(chunk_size * stride)
            .enumerate()
            .for_each(|(chunk_idx, block)| {
                let mut rng = PricerRng::for_chunk(seed, chunk_idx);
                for path in block.chunks_exact_mut(stride) {
                    step.evolve(path, spot, params.v0, &mut rng);
                }
            });

        Ok(SimulatedPaths {
            n_paths,
            n_steps,
            dt: DAILY_DT,
            seed,
            spots,
        })
    }
}

/// Per-step constants of the discretisation.
#[derive(Clone, Copy, Debug)]
struct EulerStep {
    kappa: f64,
    theta: f64,
    sigma: f64,
    rho: f64,
    drift_dt: f64,
    dt: f64,
}

impl EulerStep {
    fn new(params: &HestonParams, drift: f64, dt: f64) -> Self {
        Self {
            kappa: params.kappa,
            theta: params.theta,
            sigma: params.sigma,
            rho: params.rho,
            drift_dt: drift * dt,
            dt,
        }
    }

    /// Fills `path` starting from `(spot, v0)`.
    #[inline]
    fn evolve(&self, path: &mut [f64], spot: f64, v0: f64, rng: &mut PricerRng) {
        let mut s = spot;
        let mut v = v0;
        path[0] = s;
        for sample in path.iter_mut().skip(1) {
            let (zs, zv) = rng.gen_correlated_pair(self.rho);
            let vol_dt = (v.max(0.0) * self.dt).sqrt();
            let s_next = s + self.drift_dt * s + vol_dt * s * zs;
            v = (v + self.kappa * (self.theta - v) * self.dt + self.sigma * vol_dt * zv).max(0.0);
            s = s_next;
            *sample = s;
        }
    }
}
