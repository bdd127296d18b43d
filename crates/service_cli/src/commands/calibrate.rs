//! Calibrate command implementation
//!
//! Fits the Heston parameters to the configured implied-vol surface.

use clap::Args;
use pricer_core::types::Date;
use pricer_models::calibration::{CalibrationErrorType, CalibrationReport};
use pricer_models::models::HestonParams;
use pricer_pricing::PricingError;
use serde::Serialize;
use std::path::Path;
use tabled::Table;
use tracing::{info, warn};

use super::Context;
use crate::error::{CliError, Result};
use crate::output::{self, key_value_table, num};

/// Arguments of `calibrate`.
#[derive(Debug, Clone, Default, Args)]
pub struct CalibrateArgs {
    /// Expiry slice to fit (YYYY-MM-DD); repeat for several
    #[arg(long = "expiry", value_name = "DATE")]
    pub expiries: Vec<Date>,

    /// Fit every slice of the surface
    #[arg(long, conflicts_with = "expiries")]
    pub all_expiries: bool,

    /// Fail when the iteration cap is hit instead of reporting the last iterate
    #[arg(long)]
    pub strict: bool,
}

/// Calibration result as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationSummary {
    #[serde(flatten)]
    pub report: CalibrationReport,
    pub n_quotes: usize,
    pub error_type: CalibrationErrorType,
    pub expiries: Vec<Date>,
}

fn selected_expiries(ctx: &Context, args: &CalibrateArgs) -> Vec<Date> {
    if args.all_expiries {
        ctx.snapshot.expiries.clone()
    } else if !args.expiries.is_empty() {
        args.expiries.clone()
    } else {
        ctx.snapshot.calibration_expiries.clone()
    }
}

/// Runs the calibration.
pub fn calibrate(ctx: &Context, args: &CalibrateArgs) -> Result<CalibrationSummary> {
    let surface = ctx.snapshot.vol_surface()?;
    let mut expiries = selected_expiries(ctx, args);
    if expiries.is_empty() {
        expiries = surface.expiries().to_vec();
    }
    info!(n_slices = expiries.len(), "calibrating");

    let outcome = ctx.session.calibrate(&ctx.market, &surface, &expiries)?;
    if args.strict {
        outcome.clone().ensure_converged().map_err(PricingError::from)?;
    }
    Ok(CalibrationSummary {
        report: outcome.report(&ctx.market),
        n_quotes: outcome.n_quotes,
        error_type: ctx.session.settings().calibration.error_type,
        expiries,
    })
}

/// Run the calibrate command
pub fn run(ctx: &Context, args: &CalibrateArgs) -> Result<String> {
    let summary = calibrate(ctx, args)?;
    output::render(ctx.config.output, &summary, summary_table)
}

fn summary_table(summary: &CalibrationSummary) -> Table {
    let r = &summary.report;
    let expiries: Vec<String> = summary.expiries.iter().map(Date::to_string).collect();
    key_value_table([
        ("valuation_date", r.valuation_date.to_string()),
        ("spot", num(r.spot, 2)),
        ("expiries", expiries.join(", ")),
        ("error_type", summary.error_type.to_string()),
        ("v0", num(r.v0, 6)),
        ("kappa", num(r.kappa, 6)),
        ("theta", num(r.theta, 6)),
        ("sigma", num(r.sigma, 6)),
        ("rho", num(r.rho, 6)),
        ("converged", r.converged.to_string()),
        ("iterations", r.iterations.to_string()),
        ("n_quotes", summary.n_quotes.to_string()),
        ("rmse", format!("{:.3e}", r.rmse)),
    ])
}

/// Parameters for pricing commands.
///
/// Read from a JSON calibration report when `params_file` is given,
/// otherwise calibrated to the configured expiries. A non-converged fit is
/// used as-is after a warning.
pub fn resolve_params(ctx: &Context, params_file: Option<&Path>) -> Result<HestonParams> {
    match params_file {
        Some(path) => load_params(path),
        None => {
            let summary = calibrate(ctx, &CalibrateArgs::default())?;
            if !summary.report.converged {
                warn!(
                    iterations = summary.report.iterations,
                    rmse = summary.report.rmse,
                    "pricing with non-converged parameters"
                );
            }
            Ok(summary.report.params())
        }
    }
}

fn load_params(path: &Path) -> Result<HestonParams> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!("cannot read {}: {}", path.display(), e))
    })?;
    let report: CalibrationReport = serde_json::from_str(&content).map_err(|e| {
        CliError::InvalidArgument(format!("{} is not a calibration report: {}", path.display(), e))
    })?;
    let params = report.params();
    params.validate().map_err(PricingError::from)?;
    Ok(params)
}
