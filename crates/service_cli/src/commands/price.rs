//! Price command implementation
//!
//! Prices one vanilla, digital or down-and-out barrier option against
//! calibrated Heston parameters.

use clap::{Args, Subcommand};
use pricer_core::types::Date;
use pricer_models::instruments::{OptionSpec, OptionTerms, OptionType};
use pricer_models::models::HestonParams;
use pricer_pricing::session::Valuation;
use pricer_pricing::PricingError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::Table;
use tracing::info;

use super::Context;
use crate::error::Result;
use crate::output::{self, key_value_table, num};

/// Contract terms shared by every product.
#[derive(Debug, Clone, Args)]
pub struct OptionArgs {
    /// Maturity date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub maturity: Date,

    /// Strike price
    #[arg(long)]
    pub strike: f64,

    /// Option type (call or put)
    #[arg(long = "type", value_name = "TYPE", default_value = "call")]
    pub option_type: OptionType,

    /// JSON calibration report to price with instead of calibrating
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

/// Product to price.
#[derive(Debug, Clone, Subcommand)]
pub enum PriceCommand {
    /// European vanilla via the characteristic-function pricer
    Vanilla(OptionArgs),

    /// Cash-or-nothing digital paying 1, by simulation
    Digital(OptionArgs),

    /// Down-and-out barrier monitored daily, by simulation
    Barrier {
        #[command(flatten)]
        option: OptionArgs,

        /// Knock-out level
        #[arg(long)]
        barrier: Option<f64>,
    },
}

impl PriceCommand {
    fn option(&self) -> &OptionArgs {
        match self {
            PriceCommand::Vanilla(option) | PriceCommand::Digital(option) => option,
            PriceCommand::Barrier { option, .. } => option,
        }
    }

    /// Calibration report given with `--params`, if any.
    pub fn params_file(&self) -> Option<&Path> {
        self.option().params.as_deref()
    }

    /// Option specification of the request.
    pub fn spec(&self) -> Result<OptionSpec> {
        let option = self.option();
        let terms = OptionTerms::new(option.maturity, option.strike, option.option_type)
            .map_err(PricingError::from)?;
        Ok(match self {
            PriceCommand::Vanilla(_) => OptionSpec::Vanilla(terms),
            PriceCommand::Digital(_) => OptionSpec::Digital(terms),
            PriceCommand::Barrier { barrier, .. } => OptionSpec::down_and_out(terms, *barrier),
        })
    }
}

/// Priced request as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct PriceReport {
    pub product: &'static str,
    pub maturity: Date,
    pub strike: f64,
    pub option_type: OptionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrier: Option<f64>,
    #[serde(flatten)]
    pub valuation: Valuation,
    pub params: HestonParams,
}

/// Prices the request with `params`.
pub fn price(ctx: &Context, command: &PriceCommand, params: &HestonParams) -> Result<PriceReport> {
    let spec = command.spec()?;
    let (product, barrier) = match &spec {
        OptionSpec::Vanilla(_) => ("vanilla", None),
        OptionSpec::Digital(_) => ("digital", None),
        OptionSpec::Barrier { barrier, .. } => ("down_and_out", *barrier),
    };
    let valuation = ctx.session.price(&ctx.market, params, &spec, None)?;
    info!(product, npv = valuation.npv, "priced");

    let terms = spec.terms();
    Ok(PriceReport {
        product,
        maturity: terms.maturity,
        strike: terms.strike,
        option_type: terms.option_type,
        barrier,
        valuation,
        params: *params,
    })
}

/// Run the price command
pub fn run(ctx: &Context, command: &PriceCommand, params: &HestonParams) -> Result<String> {
    let report = price(ctx, command, params)?;
    output::render(ctx.config.output, &report, report_table)
}

fn report_table(report: &PriceReport) -> Table {
    let mut rows = vec![
        ("product", report.product.to_string()),
        ("maturity", report.maturity.to_string()),
        ("strike", num(report.strike, 2)),
        ("type", report.option_type.to_string()),
    ];
    if let Some(barrier) = report.barrier {
        rows.push(("barrier", num(barrier, 2)));
    }
    rows.push(("npv", num(report.valuation.npv, 6)));
    if let Some(se) = report.valuation.std_error {
        rows.push(("std_error", num(se, 6)));
    }
    if let Some(n) = report.valuation.n_paths {
        rows.push(("paths", n.to_string()));
    }
    key_value_table(rows)
}
