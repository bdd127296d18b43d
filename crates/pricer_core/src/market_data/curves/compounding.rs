//! Rate compounding conventions.

use std::fmt;
use std::str::FromStr;

/// How a zero rate is quoted.
///
/// Curves store continuously compounded rates; this converts them for
/// display. `Annual` is the rate `R` with `(1 + R)^t = exp(r·t)`.
///
/// ```
/// use pricer_core::market_data::Compounding;
///
/// let r = 0.05;
/// assert_eq!(Compounding::Continuous.from_continuous(r), r);
/// assert!((Compounding::Annual.from_continuous(r) - (r.exp() - 1.0)).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Compounding {
    /// `exp(r·t)`
    Continuous,
    /// `(1 + R)^t`
    #[default]
    Annual,
}

impl Compounding {
    /// Converts a continuously compounded rate to this convention.
    pub fn from_continuous(self, rate: f64) -> f64 {
        match self {
            Compounding::Continuous => rate,
            Compounding::Annual => rate.exp_m1(),
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compounding::Continuous => f.write_str("continuous"),
            Compounding::Annual => f.write_str("annual"),
        }
    }
}

impl FromStr for Compounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" => Ok(Compounding::Continuous),
            "annual" => Ok(Compounding::Annual),
            other => Err(format!("unknown compounding: {other}")),
        }
    }
}
