//! Expiry × strike implied volatility grid.

use crate::market_data::error::MarketDataError;
use crate::types::Date;

/// Quoted implied volatilities on an expiry × strike grid.
///
/// Exactly one volatility per (expiry, strike) pair. Expiries and strikes
/// are strictly increasing, strikes positive, volatilities positive and
/// finite. Immutable market input.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::VolSurface;
/// use pricer_core::types::Date;
///
/// let expiries = vec![Date::from_ymd(2022, 3, 25).unwrap()];
/// let strikes = vec![50_000.0, 60_000.0];
/// let surface = VolSurface::new(expiries, strikes, vec![vec![0.92, 0.90]]).unwrap();
///
/// assert_eq!(surface.vol(0, 1), Some(0.90));
/// assert_eq!(surface.slice(0).unwrap().quotes().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VolSurface {
    expiries: Vec<Date>,
    strikes: Vec<f64>,
    vols: Vec<Vec<f64>>,
}

/// One expiry row of a [`VolSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolSlice<'a> {
    /// Expiry date of the row
    pub expiry: Date,
    /// Strikes, ascending
    pub strikes: &'a [f64],
    /// Implied volatilities aligned with `strikes`
    pub vols: &'a [f64],
}

impl VolSlice<'_> {
    /// `(strike, vol)` pairs.
    pub fn quotes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.strikes.iter().copied().zip(self.vols.iter().copied())
    }
}

impl VolSurface {
    /// Builds a surface; `vols[i][j]` is the vol for `expiries[i]`, `strikes[j]`.
    ///
    /// # Errors
    ///
    /// `MarketDataError::InvalidSurface` for empty axes, unsorted axes,
    /// non-positive strikes, mismatched dimensions or invalid vols.
    pub fn new(
        expiries: Vec<Date>,
        strikes: Vec<f64>,
        vols: Vec<Vec<f64>>,
    ) -> Result<Self, MarketDataError> {
        let invalid = |msg: String| Err(MarketDataError::InvalidSurface(msg));

        if expiries.is_empty() || strikes.is_empty() {
            return invalid("surface needs at least one expiry and one strike".to_string());
        }
        if expiries.windows(2).any(|w| w[1] <= w[0]) {
            return invalid("expiries must be strictly increasing".to_string());
        }
        if strikes.iter().any(|k| !k.is_finite() || *k <= 0.0) {
            return invalid("strikes must be positive and finite".to_string());
        }
        if strikes.windows(2).any(|w| w[1] <= w[0]) {
            return invalid("strikes must be strictly increasing".to_string());
        }
        if vols.len() != expiries.len() {
            return invalid(format!(
                "expected {} vol rows, got {}",
                expiries.len(),
                vols.len()
            ));
        }
        for (i, row) in vols.iter().enumerate() {
            if row.len() != strikes.len() {
                return invalid(format!(
                    "row {} ({}) has {} vols for {} strikes",
                    i,
                    expiries[i],
                    row.len(),
                    strikes.len()
                ));
            }
            if let Some(v) = row.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return invalid(format!("row {} ({}) has invalid vol {}", i, expiries[i], v));
            }
        }

        Ok(Self {
            expiries,
            strikes,
            vols,
        })
    }

    /// Expiry axis.
    pub fn expiries(&self) -> &[Date] {
        &self.expiries
    }

    /// Strike axis.
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Vol at `(expiry_idx, strike_idx)`.
    pub fn vol(&self, expiry_idx: usize, strike_idx: usize) -> Option<f64> {
        self.vols.get(expiry_idx)?.get(strike_idx).copied()
    }

    /// Index of `expiry` on the expiry axis.
    pub fn expiry_index(&self, expiry: Date) -> Option<usize> {
        self.expiries.binary_search(&expiry).ok()
    }

    /// Row for `expiry_idx`.
    pub fn slice(&self, expiry_idx: usize) -> Option<VolSlice<'_>> {
        Some(VolSlice {
            expiry: *self.expiries.get(expiry_idx)?,
            strikes: &self.strikes,
            vols: self.vols.get(expiry_idx)?,
        })
    }

    /// All rows in expiry order.
    pub fn slices(&self) -> impl Iterator<Item = VolSlice<'_>> + '_ {
        (0..self.expiries.len()).filter_map(|i| self.slice(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiries() -> Vec<Date> {
        vec![
            Date::from_ymd(2021, 12, 31).unwrap(),
            Date::from_ymd(2022, 3, 25).unwrap(),
        ]
    }

    #[test]
    fn test_valid_surface_lookup() {
        let surface = VolSurface::new(
            expiries(),
            vec![30_000.0, 40_000.0, 50_000.0],
            vec![vec![1.134, 0.9864, 0.8955], vec![1.0149, 0.9587, 0.9241]],
        )
        .unwrap();

        assert_eq!(surface.vol(1, 2), Some(0.9241));
        assert_eq!(surface.vol(2, 0), None);
        assert_eq!(surface.expiry_index(Date::from_ymd(2022, 3, 25).unwrap()), Some(1));
        assert_eq!(surface.expiry_index(Date::from_ymd(2022, 3, 26).unwrap()), None);

        let slice = surface.slice(0).unwrap();
        assert_eq!(slice.expiry, expiries()[0]);
        assert_eq!(slice.quotes().collect::<Vec<_>>()[1], (40_000.0, 0.9864));
        assert_eq!(surface.slices().count(), 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = VolSurface::new(
            expiries(),
            vec![30_000.0, 40_000.0],
            vec![vec![1.0, 0.9], vec![1.0]],
        );
        assert!(matches!(err, Err(MarketDataError::InvalidSurface(_))));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let err = VolSurface::new(expiries(), vec![30_000.0], vec![vec![1.0]]);
        assert!(matches!(err, Err(MarketDataError::InvalidSurface(_))));
    }

    #[test]
    fn test_bad_axes_and_vols_rejected() {
        let unsorted = VolSurface::new(
            expiries(),
            vec![40_000.0, 30_000.0],
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
        );
        assert!(unsorted.is_err());

        let negative_vol = VolSurface::new(
            expiries(),
            vec![30_000.0, 40_000.0],
            vec![vec![1.0, -0.1], vec![1.0, 1.0]],
        );
        assert!(negative_vol.is_err());

        assert!(VolSurface::new(vec![], vec![1.0], vec![]).is_err());
    }
}
