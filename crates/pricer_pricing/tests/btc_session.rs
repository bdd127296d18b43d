//! End-to-end session on the 22 November 2021 Bitcoin market.
//!
//! Calibrates once to the March 2022 slice, then prices vanilla, digital and
//! down-and-out barrier requests with the fitted parameters.

use std::sync::OnceLock;

use pricer_core::market_data::Compounding;
use pricer_core::math::solvers::StopReason;
use pricer_core::types::Date;
use pricer_models::calibration::CalibrationOutcome;
use pricer_models::instruments::{OptionSpec, OptionTerms, OptionType};
use pricer_models::market::MarketState;
use pricer_models::models::HestonParams;
use pricer_pricing::mc::MonteCarloConfig;
use pricer_pricing::session::{
    discount_curve_series, zero_curve_series, MarketSnapshot, PricingSession, SessionSettings,
};
use pricer_pricing::PricingError;

struct Fixture {
    market: MarketState,
    session: PricingSession,
    outcome: CalibrationOutcome,
    params: HestonParams,
}

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        let snapshot = MarketSnapshot::btc_2021_11_22().unwrap();
        let market = snapshot.market_state().unwrap();
        let surface = snapshot.vol_surface().unwrap();
        let settings = SessionSettings {
            monte_carlo: MonteCarloConfig::builder().seed(2021).build().unwrap(),
            ..SessionSettings::default()
        };
        let session = PricingSession::new(settings).unwrap();
        let outcome = session
            .calibrate(&market, &surface, &snapshot.calibration_expiries)
            .unwrap();
        Fixture {
            market,
            session,
            params: outcome.params,
            outcome,
        }
    })
}

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

// ============================================================================
// Calibration
// ============================================================================

#[test]
fn test_calibrated_parameters_within_bounds() {
    let f = fixture();
    let p = f.params;
    assert!(p.validate().is_ok());
    assert!(p.v0 > 0.0 && p.v0 < 4.0, "v0 {}", p.v0);
    assert!(p.theta > 0.0 && p.theta < 4.0, "theta {}", p.theta);
    assert!(p.kappa > 0.0 && p.kappa < 1e3, "kappa {}", p.kappa);
    assert!(p.sigma > 0.0 && p.sigma < 20.0, "sigma {}", p.sigma);
    assert!(p.rho > -1.0 && p.rho < 1.0, "rho {}", p.rho);

    let call = f
        .session
        .price_vanilla(&f.market, &p, date(2022, 3, 25), 60_000.0, OptionType::Call)
        .unwrap();
    assert!(call > 0.0 && call < f.market.spot());
}

#[test]
fn test_calibration_reports_stop_reason_in_band() {
    let f = fixture();
    let outcome = &f.outcome;
    eprintln!(
        "calibration: converged={} stop={:?} iterations={} rmse={:.3e}",
        outcome.converged, outcome.stop_reason, outcome.iterations, outcome.rmse
    );
    assert_eq!(outcome.converged, outcome.stop_reason.is_converged());
    assert_eq!(outcome.n_quotes, 9);
    let cap = f.session.settings().calibration.lm.max_iterations;
    assert!(outcome.iterations <= cap);
    if outcome.stop_reason == StopReason::MaxIterations {
        assert_eq!(outcome.iterations, cap);
        assert!(outcome.clone().ensure_converged().is_err());
    }
    assert!(outcome.rmse.is_finite());
}

#[test]
fn test_calibration_improves_on_a_single_step() {
    let f = fixture();
    let snapshot = MarketSnapshot::btc_2021_11_22().unwrap();
    let surface = snapshot.vol_surface().unwrap();
    let mut settings = f.session.settings().clone();
    settings.calibration.lm.max_iterations = 1;
    let one_step = PricingSession::new(settings)
        .unwrap()
        .calibrate(&f.market, &surface, &snapshot.calibration_expiries)
        .unwrap();
    assert!(
        f.outcome.rmse <= one_step.rmse,
        "full fit rmse {} above one-step rmse {}",
        f.outcome.rmse,
        one_step.rmse
    );
}

#[test]
fn test_calibration_to_unknown_expiry_fails() {
    let f = fixture();
    let surface = MarketSnapshot::btc_2021_11_22().unwrap().vol_surface().unwrap();
    let err = f
        .session
        .calibrate(&f.market, &surface, &[date(2022, 9, 30)])
        .unwrap_err();
    assert!(matches!(err, PricingError::InvalidInput(_)));
}

// ============================================================================
// Vanilla
// ============================================================================

#[test]
fn test_vanilla_call_positive_and_decreasing_in_strike() {
    let f = fixture();
    let maturity = date(2022, 12, 31);
    let mut previous = f64::INFINITY;
    for strike in [30_000.0, 45_000.0, 60_000.0, 75_000.0, 90_000.0, 120_000.0] {
        let npv = f
            .session
            .price_vanilla(&f.market, &f.params, maturity, strike, OptionType::Call)
            .unwrap();
        assert!(npv > 0.0, "K={} npv={}", strike, npv);
        assert!(npv < previous, "K={} npv={} previous={}", strike, npv, previous);
        previous = npv;
    }
}

#[test]
fn test_put_call_parity() {
    let f = fixture();
    let maturity = date(2022, 6, 24);
    let t = f.market.time_to(maturity).unwrap();
    for strike in [40_000.0, 57_407.27, 80_000.0] {
        let call = f
            .session
            .price_vanilla(&f.market, &f.params, maturity, strike, OptionType::Call)
            .unwrap();
        let put = f
            .session
            .price_vanilla(&f.market, &f.params, maturity, strike, OptionType::Put)
            .unwrap();
        let parity = f.market.spot() * f.market.dividend_discount(t)
            - strike * f.market.discount(t).unwrap();
        assert!(
            (call - put - parity).abs() < 1e-6 * f.market.spot(),
            "K={}: C-P={} parity={}",
            strike,
            call - put,
            parity
        );
    }
}

// ============================================================================
// Monte Carlo Products
// ============================================================================

#[test]
fn test_digital_call_and_put_partition_paths() {
    let f = fixture();
    let maturity = date(2022, 3, 25);
    let call = f
        .session
        .price_digital(&f.market, &f.params, maturity, 60_000.0, OptionType::Call, 20_000)
        .unwrap();
    let put = f
        .session
        .price_digital(&f.market, &f.params, maturity, 60_000.0, OptionType::Put, 20_000)
        .unwrap();
    assert!(call.value > 0.0 && call.value < 1.0);
    assert!((call.value + put.value - 1.0).abs() < 1e-12);
}

#[test]
fn test_barrier_bounded_by_vanilla() {
    let f = fixture();
    let maturity = date(2022, 3, 25);
    let vanilla = f
        .session
        .price_vanilla(&f.market, &f.params, maturity, 60_000.0, OptionType::Call)
        .unwrap();
    let barrier = f
        .session
        .price_barrier_down_out(
            &f.market,
            &f.params,
            maturity,
            60_000.0,
            Some(45_000.0),
            OptionType::Call,
            20_000,
        )
        .unwrap();
    assert!(barrier.value > 0.0);
    assert!(
        barrier.value < vanilla + 4.0 * barrier.std_error,
        "barrier {} vanilla {}",
        barrier.value,
        vanilla
    );
}

#[test]
fn test_spec_dispatch_for_every_product() {
    let f = fixture();
    let terms = OptionTerms::new(date(2022, 3, 25), 55_000.0, OptionType::Put).unwrap();
    let specs = [
        OptionSpec::Vanilla(terms),
        OptionSpec::Digital(terms),
        OptionSpec::down_and_out(terms, Some(40_000.0)),
    ];
    for spec in &specs {
        let valuation = f.session.price(&f.market, &f.params, spec, Some(5_000)).unwrap();
        assert!(valuation.npv >= 0.0 && valuation.npv.is_finite());
        assert_eq!(valuation.std_error.is_some(), !matches!(spec, OptionSpec::Vanilla(_)));
    }

    let missing = OptionSpec::down_and_out(terms, None);
    assert!(matches!(
        f.session.price(&f.market, &f.params, &missing, Some(5_000)),
        Err(PricingError::MissingBarrierInput(_))
    ));
}

// ============================================================================
// Curves
// ============================================================================

#[test]
fn test_curve_series_for_plotting() {
    let f = fixture();
    let zeros = zero_curve_series(&f.market, 1.0, Compounding::Annual).unwrap();
    let discounts = discount_curve_series(&f.market, 1.0).unwrap();
    assert_eq!(zeros.len(), 13);
    assert_eq!(discounts[0].value, 1.0);
    assert!(discounts.windows(2).all(|w| w[1].value < w[0].value));
    assert!(zeros.iter().all(|p| p.value > 0.0 && p.value < 0.01));
}
