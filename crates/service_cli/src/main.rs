//! btc-pricer - Command Line Front End for Heston Bitcoin Option Pricing
//!
//! # Commands
//!
//! - `btc-pricer calibrate` - Fit Heston parameters to the implied-vol surface
//! - `btc-pricer price vanilla|digital|barrier` - Price one option
//! - `btc-pricer curve zero|discount` - Export the rate curve on a monthly grid
//! - `btc-pricer config` - Print the effective configuration
//!
//! # Configuration
//!
//! Settings are resolved from defaults, then the TOML file given with
//! `--config`, then `BTC_PRICER_*` environment variables, then flags.
//! Without a `[market]` section the 2021-11-22 BTC session is used.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pricer_models::calibration::CalibrationErrorType;
use pricer_pricing::mc::Drift;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use error::Result;

use commands::calibrate::CalibrateArgs;
use commands::curve::CurveCommand;
use commands::price::PriceCommand;
use commands::Context;
use config::{build_config, CliArgs, LogLevel, OutputFormat, SessionConfig};

/// Heston calibration and Bitcoin option pricing
#[derive(Parser)]
#[command(name = "btc-pricer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "BTC_PRICER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Output format (table or json)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Number of Monte Carlo paths
    #[arg(short = 'n', long, global = true)]
    paths: Option<usize>,

    /// RNG seed for reproducible Monte Carlo results
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Spot drift convention (risk_neutral or dividend_rate)
    #[arg(long, global = true)]
    drift: Option<Drift>,

    /// Discount the digital payoff to present value
    #[arg(long, global = true)]
    discount_digital: bool,

    /// Calibration error measure (relative_price, price or implied_vol)
    #[arg(long, global = true)]
    error_type: Option<CalibrationErrorType>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate Heston parameters to the implied-vol surface
    Calibrate(CalibrateArgs),

    /// Price an option
    #[command(subcommand)]
    Price(PriceCommand),

    /// Export the rate curve
    #[command(subcommand)]
    Curve(CurveCommand),

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    fn overrides(&self) -> CliArgs {
        CliArgs {
            config_file: self.config.clone(),
            log_level: self.log_level,
            output: self.format,
            n_paths: self.paths,
            seed: self.seed,
            drift: self.drift,
            discount_digital: self.discount_digital,
            error_type: self.error_type,
        }
    }
}

fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute(cli: &Cli, config: SessionConfig) -> Result<String> {
    match &cli.command {
        Commands::Config => Ok(toml::to_string_pretty(&config)?),
        Commands::Calibrate(args) => commands::calibrate::run(&Context::new(config)?, args),
        Commands::Price(command) => {
            let ctx = Context::new(config)?;
            let params = commands::calibrate::resolve_params(&ctx, command.params_file())?;
            commands::price::run(&ctx, command, &params)
        }
        Commands::Curve(command) => commands::curve::run(&Context::new(config)?, command),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = build_config(&cli.overrides()).context("failed to load configuration")?;
    init_tracing(config.log_level);
    info!(
        n_paths = config.monte_carlo.n_paths,
        seed = ?config.monte_carlo.seed,
        drift = %config.monte_carlo.drift,
        "configuration loaded"
    );

    let rendered = execute(&cli, config)?;
    println!("{}", rendered);
    Ok(())
}
