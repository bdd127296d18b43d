//! Option specifications.
//!
//! - [`OptionType`]: call or put
//! - [`OptionTerms`]: maturity, strike and type shared by every product
//! - [`OptionSpec`]: vanilla, digital or down-and-out barrier request
//! - [`InstrumentError`]: specification validation errors

mod error;
mod option;

pub use error::InstrumentError;
pub use option::{BarrierDirection, OptionSpec, OptionTerms, OptionType};
