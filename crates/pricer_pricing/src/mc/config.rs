//! Monte Carlo simulation configuration.
//!
//! [`MonteCarloConfig`] is built through a validating builder. Step counts
//! are not configured here: the simulator uses one step per calendar day to
//! maturity.

use super::error::SimulationError;
use std::fmt;
use std::str::FromStr;

/// Maximum number of paths.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of daily steps (about 27 years).
pub const MAX_STEPS: usize = 10_000;

/// Default number of paths per request.
pub const DEFAULT_PATHS: usize = 20_000;

/// Default number of paths simulated per RNG block.
pub const DEFAULT_CHUNK_SIZE: usize = 1_024;

/// Drift `mu` of the spot equation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Drift {
    /// `mu = r(T) - q`, with `r(T)` the zero rate to maturity.
    #[default]
    RiskNeutral,
    /// `mu = q`, the dividend rate alone.
    DividendRate,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::RiskNeutral => f.write_str("risk_neutral"),
            Drift::DividendRate => f.write_str("dividend_rate"),
        }
    }
}

impl FromStr for Drift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "risk_neutral" => Ok(Drift::RiskNeutral),
            "dividend_rate" | "dividend" => Ok(Drift::DividendRate),
            other => Err(format!("unknown drift convention: {other}")),
        }
    }
}

/// Path simulator settings.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{Drift, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(50_000)
///     .seed(42)
///     .drift(Drift::DividendRate)
///     .build()
///     .unwrap();
/// assert_eq!(config.n_paths(), 50_000);
/// assert_eq!(config.seed(), Some(42));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MonteCarloConfig {
    n_paths: usize,
    seed: Option<u64>,
    drift: Drift,
    chunk_size: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            seed: None,
            drift: Drift::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl MonteCarloConfig {
    /// Starts a builder with default settings.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Base seed; `None` draws a fresh one per simulation.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Drift convention.
    #[inline]
    pub fn drift(&self) -> Drift {
        self.drift
    }

    /// Paths per RNG block.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Same settings with another path count.
    pub fn with_paths(&self, n_paths: usize) -> Result<Self, SimulationError> {
        let config = Self {
            n_paths,
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks path count and block size.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(SimulationError::InvalidPathCount(self.n_paths));
        }
        if self.chunk_size == 0 {
            return Err(SimulationError::InvalidParameter {
                name: "chunk_size",
                value: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`].
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    seed: Option<u64>,
    drift: Drift,
    chunk_size: Option<usize>,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of paths (default 20 000).
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Fixes the base seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the seed from an optional value.
    #[inline]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the drift convention.
    #[inline]
    pub fn drift(mut self, drift: Drift) -> Self {
        self.drift = drift;
        self
    }

    /// Sets the paths per RNG block (default 1 024).
    #[inline]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Validates and builds.
    pub fn build(self) -> Result<MonteCarloConfig, SimulationError> {
        let config = MonteCarloConfig {
            n_paths: self.n_paths.unwrap_or(DEFAULT_PATHS),
            seed: self.seed,
            drift: self.drift,
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MonteCarloConfig::builder().build().unwrap();
        assert_eq!(config.n_paths(), DEFAULT_PATHS);
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.drift(), Drift::RiskNeutral);
        assert_eq!(config.seed(), None);
        assert_eq!(config, MonteCarloConfig::default());
    }

    #[test]
    fn test_builder_with_seed_and_drift() {
        let config = MonteCarloConfig::builder()
            .n_paths(1000)
            .seed(42)
            .drift(Drift::DividendRate)
            .chunk_size(128)
            .build()
            .unwrap();
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.drift(), Drift::DividendRate);
        assert_eq!(config.chunk_size(), 128);

        let unseeded = MonteCarloConfig::builder().maybe_seed(None).build().unwrap();
        assert_eq!(unseeded.seed(), None);
    }

    #[test]
    fn test_invalid_path_counts() {
        let result = MonteCarloConfig::builder().n_paths(0).build();
        assert!(matches!(result, Err(SimulationError::InvalidPathCount(0))));

        let result = MonteCarloConfig::builder().n_paths(MAX_PATHS + 1).build();
        assert!(matches!(result, Err(SimulationError::InvalidPathCount(_))));

        let config = MonteCarloConfig::default();
        assert!(matches!(
            config.with_paths(0),
            Err(SimulationError::InvalidPathCount(0))
        ));
        assert_eq!(config.with_paths(500).unwrap().n_paths(), 500);
    }

    #[test]
    fn test_invalid_chunk_size() {
        let result = MonteCarloConfig::builder().chunk_size(0).build();
        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter {
                name: "chunk_size",
                ..
            })
        ));
    }

    #[test]
    fn test_drift_parse() {
        assert_eq!("risk-neutral".parse::<Drift>().unwrap(), Drift::RiskNeutral);
        assert_eq!("DIVIDEND_RATE".parse::<Drift>().unwrap(), Drift::DividendRate);
        assert!("libor".parse::<Drift>().is_err());
        assert_eq!(Drift::DividendRate.to_string(), "dividend_rate");
    }
}
