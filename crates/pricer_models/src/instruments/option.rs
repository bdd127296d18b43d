//! European option specifications.

use super::InstrumentError;
use pricer_core::types::Date;
use std::fmt;
use std::str::FromStr;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    /// Right to buy
    Call,
    /// Right to sell
    Put,
}

impl OptionType {
    /// Intrinsic value `max(S - K, 0)` or `max(K - S, 0)`.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Whether a cash-or-nothing digital pays: `S > K` for calls, `S < K` for puts.
    #[inline]
    pub fn is_in_the_money(self, spot: f64, strike: f64) -> bool {
        match self {
            OptionType::Call => spot > strike,
            OptionType::Put => spot < strike,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => f.write_str("call"),
            OptionType::Put => f.write_str("put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(InstrumentError::Parse(format!("unknown option type: {other}"))),
        }
    }
}

/// Barrier monitoring direction. Only down-and-out is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BarrierDirection {
    /// Knocked out once spot trades at or below the barrier.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "down-and-out"))]
    DownOut,
}

impl BarrierDirection {
    /// Whether a path sample at `spot` is still alive.
    #[inline]
    pub fn survives(self, spot: f64, barrier: f64) -> bool {
        match self {
            BarrierDirection::DownOut => spot > barrier,
        }
    }
}

impl fmt::Display for BarrierDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierDirection::DownOut => f.write_str("down-and-out"),
        }
    }
}

/// Maturity, strike and type common to every product.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionTerms {
    /// Expiry date
    pub maturity: Date,
    /// Strike price
    pub strike: f64,
    /// Call or put
    pub option_type: OptionType,
}

impl OptionTerms {
    /// Creates terms, validating the strike.
    pub fn new(maturity: Date, strike: f64, option_type: OptionType) -> Result<Self, InstrumentError> {
        let terms = Self {
            maturity,
            strike,
            option_type,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Strike must be positive and finite.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(InstrumentError::InvalidStrike {
                strike: self.strike,
            });
        }
        Ok(())
    }
}

/// A single pricing request.
///
/// Created per request and consumed once.
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_models::instruments::{OptionSpec, OptionTerms, OptionType};
///
/// let terms = OptionTerms::new(Date::from_ymd(2022, 12, 31).unwrap(), 60_000.0, OptionType::Call).unwrap();
/// let spec = OptionSpec::down_and_out(terms, Some(45_000.0));
/// assert_eq!(spec.barrier_level().unwrap(), 45_000.0);
///
/// let incomplete = OptionSpec::down_and_out(terms, None);
/// assert!(incomplete.barrier_level().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum OptionSpec {
    /// European vanilla, priced semi-analytically.
    Vanilla(OptionTerms),
    /// Cash-or-nothing digital paying 1, priced by simulation.
    Digital(OptionTerms),
    /// Barrier option with discrete monitoring on the simulation grid.
    Barrier {
        /// Maturity, strike and type
        terms: OptionTerms,
        /// Barrier level; `None` when the caller did not supply one
        barrier: Option<f64>,
        /// Monitoring direction
        direction: BarrierDirection,
    },
}

impl OptionSpec {
    /// Down-and-out barrier request.
    pub fn down_and_out(terms: OptionTerms, barrier: Option<f64>) -> Self {
        OptionSpec::Barrier {
            terms,
            barrier,
            direction: BarrierDirection::DownOut,
        }
    }

    /// Shared terms.
    pub fn terms(&self) -> &OptionTerms {
        match self {
            OptionSpec::Vanilla(terms) | OptionSpec::Digital(terms) => terms,
            OptionSpec::Barrier { terms, .. } => terms,
        }
    }

    /// Barrier level of a barrier request.
    ///
    /// # Errors
    ///
    /// `MissingBarrier` if absent, `InvalidBarrier` if not positive and
    /// finite, `InvalidStrike` from the terms. Non-barrier requests return
    /// `MissingBarrier` as well.
    pub fn barrier_level(&self) -> Result<f64, InstrumentError> {
        match self {
            OptionSpec::Barrier {
                barrier, direction, ..
            } => {
                let level = barrier.ok_or_else(|| InstrumentError::MissingBarrier {
                    direction: direction.to_string(),
                })?;
                if !level.is_finite() || level <= 0.0 {
                    return Err(InstrumentError::InvalidBarrier { barrier: level });
                }
                Ok(level)
            }
            _ => Err(InstrumentError::MissingBarrier {
                direction: BarrierDirection::DownOut.to_string(),
            }),
        }
    }

    /// Validates strike and, for barriers, the barrier level.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        self.terms().validate()?;
        if matches!(self, OptionSpec::Barrier { .. }) {
            self.barrier_level()?;
        }
        Ok(())
    }
}
