//! Heston model calibration.
//!
//! - [`HestonCalibrator`]: Levenberg-Marquardt fit to implied-vol slices
//! - [`CalibrationOutcome`]: fitted parameters with convergence diagnostics
//! - [`CalibrationReport`]: flat, serialisable summary
//! - [`CalibrationError`]: failure modes, including in-band non-convergence
//!
//! ```text
//! VolSurface slice ──► BS market prices ──┐
//!                                         ├──► residuals ──► L-M ──► HestonParams
//! HestonParams ──► Fourier model prices ──┘
//! ```

mod error;
pub mod heston;
mod result;
pub mod transform;

pub use error::CalibrationError;
pub use heston::{CalibrationErrorType, HestonCalibrator, HestonCalibratorConfig};
pub use result::{CalibrationOutcome, CalibrationReport};
