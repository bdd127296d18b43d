//! Session configuration management
//!
//! Loads the session configuration from defaults, a TOML file, `BTC_PRICER_*`
//! environment variables and command-line flags, in increasing priority.

use pricer_core::math::solvers::LMConfig;
use pricer_models::analytical::FourierConfig;
use pricer_models::calibration::{CalibrationErrorType, HestonCalibratorConfig};
use pricer_models::models::HestonParams;
use pricer_pricing::mc::{Drift, MonteCarloConfig, DEFAULT_CHUNK_SIZE, DEFAULT_PATHS};
use pricer_pricing::session::{MarketSnapshot, SessionSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CliError, Result};

/// Prefix of every environment variable read by the CLI.
pub const ENV_PREFIX: &str = "BTC_PRICER_";

/// Log levels accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!(
                "invalid log level '{}', expected one of: trace, debug, info, warn, error",
                s
            )),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned key/value or column table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("invalid output format '{}', expected table or json", s)),
        }
    }
}

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSection {
    /// Paths per request
    pub n_paths: usize,
    /// Fixed RNG seed; fresh entropy per request when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Drift convention of the spot equation
    pub drift: Drift,
    /// Paths per RNG block
    pub chunk_size: usize,
    /// Present-value the digital payoff
    pub discount_digital: bool,
}

impl Default for MonteCarloSection {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            seed: None,
            drift: Drift::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            discount_digital: false,
        }
    }
}

/// Calibration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSection {
    /// Residual definition of each helper
    pub error_type: CalibrationErrorType,
    /// Levenberg-Marquardt iteration cap
    pub max_iterations: usize,
    /// Consecutive rejected steps before stopping
    pub max_stationary_iterations: usize,
    /// Relative cost-change tolerance
    pub function_tolerance: f64,
    /// Relative parameter-change tolerance
    pub param_tolerance: f64,
    /// Gradient max-norm tolerance
    pub gradient_tolerance: f64,
    /// Starting point of the fit
    pub initial_guess: HestonParams,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        let lm = HestonCalibratorConfig::default().lm;
        Self {
            error_type: CalibrationErrorType::default(),
            max_iterations: lm.max_iterations,
            max_stationary_iterations: lm.max_stationary_iterations,
            function_tolerance: lm.function_tolerance,
            param_tolerance: lm.param_tolerance,
            gradient_tolerance: lm.gradient_tolerance,
            initial_guess: HestonParams::default(),
        }
    }
}

impl CalibrationSection {
    fn lm_config(&self) -> LMConfig {
        LMConfig {
            jacobian_step: HestonCalibratorConfig::default().lm.jacobian_step,
            ..LMConfig::with_end_criteria(
                self.max_iterations,
                self.max_stationary_iterations,
                self.param_tolerance,
                self.function_tolerance,
                self.gradient_tolerance,
            )
        }
    }
}

/// Full session configuration.
///
/// Every field has a default; a TOML file only needs the keys it changes:
///
/// ```toml
/// log_level = "debug"
///
/// [monte_carlo]
/// n_paths = 50000
/// seed = 7
///
/// [calibration]
/// error_type = "implied_vol"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tracing level when `RUST_LOG` is unset
    pub log_level: LogLevel,
    /// Result rendering
    pub output: OutputFormat,
    /// Path simulation
    pub monte_carlo: MonteCarloSection,
    /// Characteristic-function quadrature
    pub quadrature: FourierConfig,
    /// Levenberg-Marquardt fit
    pub calibration: CalibrationSection,
    /// Market data; the 2021-11-22 BTC session when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketSnapshot>,
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::ConfigFile(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CliError::ConfigFile(format!("failed to parse TOML: {}", e)))
    }

    /// Overrides fields from `BTC_PRICER_*` variables of the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overrides fields from variables resolved through `lookup`.
    ///
    /// Recognised suffixes: `LOG_LEVEL`, `OUTPUT`, `PATHS`, `SEED`, `DRIFT`,
    /// `CHUNK_SIZE`, `DISCOUNT_DIGITAL`, `ERROR_TYPE`, `MAX_ITERATIONS`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            let name = format!("{}{}", ENV_PREFIX, suffix);
            lookup(&name).map(|value| (name, value))
        };

        if let Some((name, value)) = var("LOG_LEVEL") {
            self.log_level = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("OUTPUT") {
            self.output = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("PATHS") {
            self.monte_carlo.n_paths = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("SEED") {
            self.monte_carlo.seed = Some(parse_env(&name, &value)?);
        }
        if let Some((name, value)) = var("DRIFT") {
            self.monte_carlo.drift = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("CHUNK_SIZE") {
            self.monte_carlo.chunk_size = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("DISCOUNT_DIGITAL") {
            self.monte_carlo.discount_digital = parse_flag(&name, &value)?;
        }
        if let Some((name, value)) = var("ERROR_TYPE") {
            self.calibration.error_type = parse_env(&name, &value)?;
        }
        if let Some((name, value)) = var("MAX_ITERATIONS") {
            self.calibration.max_iterations = parse_env(&name, &value)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if let Some(n_paths) = cli.n_paths {
            self.monte_carlo.n_paths = n_paths;
        }
        if let Some(seed) = cli.seed {
            self.monte_carlo.seed = Some(seed);
        }
        if let Some(drift) = cli.drift {
            self.monte_carlo.drift = drift;
        }
        if cli.discount_digital {
            self.monte_carlo.discount_digital = true;
        }
        if let Some(error_type) = cli.error_type {
            self.calibration.error_type = error_type;
        }
    }

    /// Monte Carlo configuration, validated.
    pub fn monte_carlo_config(&self) -> Result<MonteCarloConfig> {
        let mc = &self.monte_carlo;
        MonteCarloConfig::builder()
            .n_paths(mc.n_paths)
            .maybe_seed(mc.seed)
            .drift(mc.drift)
            .chunk_size(mc.chunk_size)
            .build()
            .map_err(|e| CliError::Pricing(e.into()))
    }

    /// Settings for a [`pricer_pricing::session::PricingSession`].
    pub fn session_settings(&self) -> Result<SessionSettings> {
        Ok(SessionSettings {
            calibration: HestonCalibratorConfig {
                lm: self.calibration.lm_config(),
                error_type: self.calibration.error_type,
                fourier: self.quadrature,
            },
            monte_carlo: self.monte_carlo_config()?,
            discount_digital: self.monte_carlo.discount_digital,
            initial_guess: self.calibration.initial_guess,
        })
    }

    /// Market data of the session.
    pub fn market(&self) -> Result<MarketSnapshot> {
        match &self.market {
            Some(snapshot) => Ok(snapshot.clone()),
            None => Ok(MarketSnapshot::btc_2021_11_22()?),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.monte_carlo_config()?;
        if self.calibration.max_iterations == 0 {
            return Err(CliError::InvalidArgument(
                "calibration.max_iterations must be positive".to_string(),
            ));
        }
        self.calibration
            .initial_guess
            .validate()
            .map_err(|e| CliError::Pricing(e.into()))?;
        Ok(())
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| CliError::Env {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CliError::Env {
            name: name.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Overrides collected from command-line flags
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<LogLevel>,
    /// Output format override
    pub output: Option<OutputFormat>,
    /// Path count override
    pub n_paths: Option<usize>,
    /// Seed override
    pub seed: Option<u64>,
    /// Drift override
    pub drift: Option<Drift>,
    /// Discount the digital payoff
    pub discount_digital: bool,
    /// Calibration error measure override
    pub error_type: Option<CalibrationErrorType>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<SessionConfig> {
    let mut config = match &cli.config_file {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    config.apply_env()?;
    config.merge_with_cli(cli);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    // ========================================
    // Defaults and Parsing
    // ========================================

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.output, OutputFormat::Table);
        assert_eq!(config.monte_carlo.n_paths, 20_000);
        assert_eq!(config.monte_carlo.seed, None);
        assert_eq!(config.monte_carlo.drift, Drift::RiskNeutral);
        assert!(!config.monte_carlo.discount_digital);
        assert_eq!(config.quadrature.initial_nodes, 64);
        assert_eq!(config.quadrature.max_nodes, 1024);
        assert_eq!(config.calibration.max_iterations, 500);
        assert_eq!(config.calibration.max_stationary_iterations, 50);
        assert_eq!(config.calibration.error_type, CalibrationErrorType::RelativePrice);
        assert!(config.market.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("table").unwrap(), OutputFormat::Table);
        assert!(OutputFormat::from_str("csv").is_err());
    }

    #[test]
    fn test_partial_toml_deserialization() {
        let config = SessionConfig::from_toml_str(
            r#"
            log_level = "debug"

            [monte_carlo]
            n_paths = 5000
            seed = 42
            drift = "dividend_rate"

            [calibration]
            error_type = "implied_vol"
            max_iterations = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.monte_carlo.n_paths, 5000);
        assert_eq!(config.monte_carlo.seed, Some(42));
        assert_eq!(config.monte_carlo.drift, Drift::DividendRate);
        assert_eq!(config.monte_carlo.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.calibration.error_type, CalibrationErrorType::ImpliedVol);
        assert_eq!(config.calibration.max_iterations, 100);
        assert_eq!(config.calibration.max_stationary_iterations, 50);
        assert_eq!(config.quadrature, FourierConfig::default());
    }

    #[test]
    fn test_market_section_from_toml() {
        let config = SessionConfig::from_toml_str(
            r#"
            [market]
            valuation_date = "2024-01-02"
            spot = 45000.0
            dividend_rate = 0.0
            expiries = ["2024-03-29"]
            strikes = [40000.0, 45000.0, 50000.0]
            vols = [[0.62, 0.58, 0.60]]
            calibration_expiries = ["2024-03-29"]

            [[market.rate_pillars]]
            date = "2024-01-02"
            rate = 0.05

            [[market.rate_pillars]]
            date = "2025-01-02"
            rate = 0.048
            "#,
        )
        .unwrap();
        let snapshot = config.market().unwrap();
        assert_eq!(snapshot.rate_pillars.len(), 2);
        let market = snapshot.market_state().unwrap();
        assert_eq!(market.spot(), 45_000.0);
        assert_eq!(snapshot.vol_surface().unwrap().strikes().len(), 3);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = SessionConfig::from_toml_str("[monte_carlo\nn_paths = 1").unwrap_err();
        assert!(matches!(err, CliError::ConfigFile(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SessionConfig::from_file(Path::new("/nonexistent/btc-pricer.toml")).unwrap_err();
        assert!(matches!(err, CliError::ConfigFile(_)));
    }

    #[test]
    fn test_default_market_is_btc_session() {
        let snapshot = SessionConfig::default().market().unwrap();
        assert_eq!(snapshot.spot, 57_407.27);
        assert_eq!(snapshot.expiries.len(), 3);
    }

    // ========================================
    // Precedence
    // ========================================

    #[test]
    fn test_env_overrides_file() {
        let mut config = SessionConfig::from_toml_str("[monte_carlo]\nn_paths = 5000").unwrap();
        config
            .apply_env_from(env(&[
                ("BTC_PRICER_PATHS", "8000"),
                ("BTC_PRICER_SEED", "11"),
                ("BTC_PRICER_DRIFT", "dividend"),
                ("BTC_PRICER_DISCOUNT_DIGITAL", "true"),
                ("BTC_PRICER_ERROR_TYPE", "price"),
            ]))
            .unwrap();
        assert_eq!(config.monte_carlo.n_paths, 8000);
        assert_eq!(config.monte_carlo.seed, Some(11));
        assert_eq!(config.monte_carlo.drift, Drift::DividendRate);
        assert!(config.monte_carlo.discount_digital);
        assert_eq!(config.calibration.error_type, CalibrationErrorType::Price);
    }

    #[test]
    fn test_unset_env_leaves_config() {
        let mut config = SessionConfig::default();
        config.apply_env_from(env(&[])).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_bad_env_value_names_variable() {
        let mut config = SessionConfig::default();
        let err = config
            .apply_env_from(env(&[("BTC_PRICER_PATHS", "many")]))
            .unwrap_err();
        match err {
            CliError::Env { name, .. } => assert_eq!(name, "BTC_PRICER_PATHS"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(config
            .apply_env_from(env(&[("BTC_PRICER_DISCOUNT_DIGITAL", "maybe")]))
            .is_err());
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = SessionConfig::default();
        config
            .apply_env_from(env(&[("BTC_PRICER_PATHS", "8000"), ("BTC_PRICER_LOG_LEVEL", "warn")]))
            .unwrap();
        let cli = CliArgs {
            n_paths: Some(1000),
            output: Some(OutputFormat::Json),
            ..Default::default()
        };
        config.merge_with_cli(&cli);
        assert_eq!(config.monte_carlo.n_paths, 1000);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    // ========================================
    // Session Settings
    // ========================================

    #[test]
    fn test_session_settings_carry_sections() {
        let mut config = SessionConfig::default();
        config.monte_carlo.seed = Some(3);
        config.monte_carlo.discount_digital = true;
        config.calibration.max_iterations = 42;
        config.quadrature.max_nodes = 512;

        let settings = config.session_settings().unwrap();
        assert_eq!(settings.monte_carlo.seed(), Some(3));
        assert!(settings.discount_digital);
        assert_eq!(settings.calibration.lm.max_iterations, 42);
        assert_eq!(settings.calibration.fourier.max_nodes, 512);
        assert_eq!(settings.initial_guess, HestonParams::default());
    }

    #[test]
    fn test_calibration_section_sets_end_criteria() {
        let mut config = SessionConfig::default();
        config.calibration.max_stationary_iterations = 7;
        config.calibration.gradient_tolerance = 1e-10;

        let lm = config.session_settings().unwrap().calibration.lm;
        assert_eq!(lm.max_iterations, 500);
        assert_eq!(lm.max_stationary_iterations, 7);
        assert_eq!(lm.param_tolerance, 1e-8);
        assert_eq!(lm.function_tolerance, 1e-8);
        assert_eq!(lm.gradient_tolerance, 1e-10);
        assert_eq!(lm.jacobian_step, HestonCalibratorConfig::default().lm.jacobian_step);
    }

    #[test]
    fn test_zero_paths_rejected() {
        let mut config = SessionConfig::default();
        config.monte_carlo.n_paths = 0;
        assert!(config.validate().is_err());
        assert!(config.session_settings().is_err());
    }

    #[test]
    fn test_invalid_initial_guess_rejected() {
        let mut config = SessionConfig::default();
        config.calibration.initial_guess.rho = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialises_back_to_toml() {
        let config = SessionConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = SessionConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
