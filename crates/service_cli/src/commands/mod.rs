//! CLI command implementations
//!
//! Each submodule implements one subcommand and returns the rendered output.

pub mod calibrate;
pub mod curve;
pub mod price;

use pricer_models::market::MarketState;
use pricer_pricing::session::{MarketSnapshot, PricingSession};

use crate::config::SessionConfig;
use crate::error::Result;

/// Session, market and configuration shared by all commands.
pub struct Context {
    /// Effective configuration
    pub config: SessionConfig,
    /// Market data the session was built from
    pub snapshot: MarketSnapshot,
    /// Market state built from the snapshot
    pub market: MarketState,
    /// Pricing session
    pub session: PricingSession,
}

impl Context {
    /// Builds the market state and the pricing session from `config`.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let snapshot = config.market()?;
        let market = snapshot.market_state()?;
        let session = PricingSession::new(config.session_settings()?)?;
        Ok(Self {
            config,
            snapshot,
            market,
            session,
        })
    }
}
