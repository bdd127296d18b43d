//! Implied volatility surfaces.
//!
//! - [`VolSurface`]: expiry × strike grid of quoted implied volatilities
//! - [`VolSlice`]: borrowed view of one expiry row

mod vol_surface;

pub use vol_surface::{VolSlice, VolSurface};
