//! Calendar dates and day count conventions.
//!
//! Every pricing call measures time from an explicit valuation date carried
//! by the caller; there is no process-wide "today".
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::time::{Date, DayCountConvention};
//!
//! let valuation = Date::from_ymd(2021, 11, 22).unwrap();
//! let expiry = Date::from_ymd(2022, 3, 25).unwrap();
//!
//! let t = DayCountConvention::Actual365Fixed.year_fraction(valuation, expiry);
//! assert!((t - 123.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around `chrono::NaiveDate`.
///
/// Serialises as an ISO 8601 string (`YYYY-MM-DD`).
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::Date;
///
/// let date = Date::from_ymd(2022, 3, 25).unwrap();
/// let parsed: Date = "2022-03-25".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let start = Date::from_ymd(2021, 11, 22).unwrap();
/// assert_eq!(date - start, 123);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date from year, month and day components.
    ///
    /// Returns `DateError::InvalidDate` for impossible dates such as
    /// February 30th.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format (`YYYY-MM-DD`).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("{s:?}: {e}")))
    }

    /// Returns the date `days` calendar days later (earlier when negative).
    ///
    /// Returns `DateError::OutOfRange` when the result is not representable.
    pub fn add_days(self, days: i64) -> Result<Self, DateError> {
        Duration::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Date)
            .ok_or_else(|| DateError::OutOfRange {
                date: self.to_string(),
                days,
            })
    }

    /// Returns the underlying `NaiveDate`.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl Sub for Date {
    type Output = i64;

    /// Number of calendar days from `other` to `self`.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day count convention used to turn date pairs into year fractions.
///
/// The BTC market set is quoted Actual/365 Fixed with no holiday calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCountConvention {
    /// Actual/365 Fixed: actual_days / 365.0
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "ACT/365F"))]
    Actual365Fixed,

    /// Actual/360: actual_days / 360.0
    #[cfg_attr(feature = "serde", serde(rename = "ACT/360"))]
    Actual360,

    /// 30/360 US bond basis.
    #[cfg_attr(feature = "serde", serde(rename = "30/360"))]
    Thirty360,
}

impl DayCountConvention {
    /// Standard convention name.
    ///
    /// ```
    /// use pricer_core::types::time::DayCountConvention;
    ///
    /// assert_eq!(DayCountConvention::Actual365Fixed.name(), "ACT/365F");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Actual365Fixed => "ACT/365F",
            DayCountConvention::Actual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Signed year fraction from `start` to `end`.
    ///
    /// Negative when `end` precedes `start`.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCountConvention::Actual365Fixed => (end - start) as f64 / 365.0,
            DayCountConvention::Actual360 => (end - start) as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                if end < start {
                    return -self.year_fraction(end, start);
                }
                let d1 = start.day().min(30);
                let d2 = if end.day() == 31 && d1 == 30 {
                    30
                } else {
                    end.day()
                };
                let days = 360 * (end.year() - start.year())
                    + 30 * (end.month() as i32 - start.month() as i32)
                    + (d2 as i32 - d1 as i32);
                days as f64 / 360.0
            }
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACT/365F" | "ACT/365" | "ACT365F" | "ACTUAL365FIXED" => {
                Ok(DayCountConvention::Actual365Fixed)
            }
            "ACT/360" | "ACT360" | "ACTUAL360" => Ok(DayCountConvention::Actual360),
            "30/360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            other => Err(DateError::ParseError(format!(
                "unknown day count convention: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Date Tests
    // ========================================

    #[test]
    fn test_from_ymd_valid_and_invalid() {
        assert!(Date::from_ymd(2024, 2, 29).is_ok());
        assert_eq!(
            Date::from_ymd(2023, 2, 29),
            Err(DateError::InvalidDate {
                year: 2023,
                month: 2,
                day: 29
            })
        );
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let date = Date::parse("2021-11-22").unwrap();
        assert_eq!(date.to_string(), "2021-11-22");
        assert!(Date::parse("22/11/2021").is_err());
    }

    #[test]
    fn test_sub_and_add_days() {
        let start = Date::from_ymd(2021, 11, 22).unwrap();
        let end = Date::from_ymd(2021, 12, 31).unwrap();
        assert_eq!(end - start, 39);
        assert_eq!(start.add_days(39).unwrap(), end);
        assert_eq!(end.add_days(-39).unwrap(), start);
    }

    #[test]
    fn test_add_days_out_of_range() {
        let start = Date::from_ymd(2021, 11, 22).unwrap();
        assert!(matches!(
            start.add_days(i64::MAX),
            Err(DateError::OutOfRange { days: i64::MAX, .. })
        ));
        assert!(start.add_days(-1_000_000_000).is_err());
    }

    // ========================================
    // DayCountConvention Tests
    // ========================================

    #[test]
    fn test_act365_fixed() {
        let start = Date::from_ymd(2021, 11, 22).unwrap();
        let end = Date::from_ymd(2022, 11, 23).unwrap();
        let yf = DayCountConvention::Actual365Fixed.year_fraction(start, end);
        assert_relative_eq!(yf, 366.0 / 365.0, epsilon = 1e-14);
        assert_relative_eq!(
            DayCountConvention::Actual365Fixed.year_fraction(end, start),
            -yf,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_act360() {
        let start = Date::from_ymd(2024, 1, 1).unwrap();
        let end = Date::from_ymd(2024, 7, 1).unwrap();
        let yf = DayCountConvention::Actual360.year_fraction(start, end);
        assert_relative_eq!(yf, 182.0 / 360.0, epsilon = 1e-14);
    }

    #[test]
    fn test_thirty360_end_of_month() {
        let start = Date::from_ymd(2024, 1, 31).unwrap();
        let end = Date::from_ymd(2024, 3, 31).unwrap();
        let yf = DayCountConvention::Thirty360.year_fraction(start, end);
        assert_relative_eq!(yf, 60.0 / 360.0, epsilon = 1e-14);
    }

    #[test]
    fn test_convention_from_str() {
        assert_eq!(
            "act/365f".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Actual365Fixed
        );
        assert_eq!(
            "30/360".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Thirty360
        );
        assert!("bus/252".parse::<DayCountConvention>().is_err());
    }
}
