//! Instrument error types.

use thiserror::Error;

/// Option specification errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// Strike must be positive and finite.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The rejected strike
        strike: f64,
    },

    /// A barrier product was requested without its barrier level.
    #[error("Missing barrier level for {direction} option")]
    MissingBarrier {
        /// Barrier direction that needed a level
        direction: String,
    },

    /// Barrier must be positive and finite.
    #[error("Invalid barrier: H = {barrier}")]
    InvalidBarrier {
        /// The rejected barrier
        barrier: f64,
    },

    /// Unrecognised textual option type or direction.
    #[error("Parse error: {0}")]
    Parse(String),
}
