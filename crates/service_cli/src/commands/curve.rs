//! Curve command implementation
//!
//! Exports zero rates or discount factors of the session curve on a
//! monthly grid.

use clap::Subcommand;
use pricer_core::market_data::{Compounding, CurvePoint};
use pricer_pricing::session::{discount_curve_series, zero_curve_series};

use super::Context;
use crate::error::Result;
use crate::output::{self, column_table, num};

/// Curve series to export.
#[derive(Debug, Clone, Subcommand)]
pub enum CurveCommand {
    /// Zero rates
    Zero {
        /// Horizon in years
        #[arg(long, default_value_t = 1.0)]
        horizon: f64,

        /// Rate convention (annual or continuous)
        #[arg(long, default_value = "annual")]
        compounding: Compounding,
    },

    /// Discount factors
    Discount {
        /// Horizon in years
        #[arg(long, default_value_t = 1.0)]
        horizon: f64,
    },
}

/// Computes the requested series.
pub fn series(ctx: &Context, command: &CurveCommand) -> Result<Vec<CurvePoint>> {
    let points = match command {
        CurveCommand::Zero {
            horizon,
            compounding,
        } => zero_curve_series(&ctx.market, *horizon, *compounding)?,
        CurveCommand::Discount { horizon } => discount_curve_series(&ctx.market, *horizon)?,
    };
    Ok(points)
}

/// Run the curve command
pub fn run(ctx: &Context, command: &CurveCommand) -> Result<String> {
    let points = series(ctx, command)?;
    let column = match command {
        CurveCommand::Zero { .. } => "zero_rate",
        CurveCommand::Discount { .. } => "discount",
    };
    output::render(ctx.config.output, &points, |points| {
        column_table(
            ["t", column],
            points.iter().map(|p| vec![num(p.t, 4), num(p.value, 8)]),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, SessionConfig};
    use crate::error::CliError;
    use approx::assert_relative_eq;
    use pricer_pricing::PricingError;

    fn context(output: OutputFormat) -> Context {
        let config = SessionConfig {
            output,
            ..Default::default()
        };
        Context::new(config).unwrap()
    }

    #[test]
    fn test_monthly_grid() {
        let ctx = context(OutputFormat::Table);
        let points = series(&ctx, &CurveCommand::Discount { horizon: 1.0 }).unwrap();
        assert_eq!(points.len(), 13);
        assert_relative_eq!(points[0].value, 1.0);
        assert_relative_eq!(points[12].t, 1.0, epsilon = 1e-12);
        assert!(points.windows(2).all(|w| w[1].value <= w[0].value));
    }

    #[test]
    fn test_continuous_rates_below_annual() {
        let ctx = context(OutputFormat::Table);
        let zero = |compounding| {
            series(
                &ctx,
                &CurveCommand::Zero {
                    horizon: 1.0,
                    compounding,
                },
            )
            .unwrap()
        };
        let annual = zero(Compounding::Annual);
        let continuous = zero(Compounding::Continuous);
        assert!(annual[12].value > continuous[12].value);
        assert!(annual[12].value > 0.0);
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let ctx = context(OutputFormat::Table);
        let text = run(&ctx, &CurveCommand::Discount { horizon: 0.5 }).unwrap();
        assert!(text.contains("discount"));
        assert!(text.contains("0.5000"));
        assert!(text.lines().count() >= 2 + 7);
    }

    #[test]
    fn test_json_is_array_of_points() {
        let ctx = context(OutputFormat::Json);
        let text = run(
            &ctx,
            &CurveCommand::Zero {
                horizon: 1.0,
                compounding: Compounding::Continuous,
            },
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 13);
        assert!(value[3]["t"].is_f64());
    }

    #[test]
    fn test_negative_horizon_rejected() {
        let ctx = context(OutputFormat::Table);
        assert!(series(&ctx, &CurveCommand::Discount { horizon: -1.0 }).is_err());
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let ctx = context(OutputFormat::Table);
        let command = CurveCommand::Zero {
            horizon: 1e17,
            compounding: Compounding::Annual,
        };
        assert!(matches!(
            run(&ctx, &command),
            Err(CliError::Pricing(PricingError::InvalidInput(_)))
        ));
    }
}
