//! EOSIO value types used by the DFS tables: names, symbols, assets,
//! fixed-point scalars and second-resolution time points.

pub mod asset;
pub mod name;
pub mod scalar;
pub mod symbol;
pub mod time;

use thiserror::Error;

pub use asset::{Asset, MAX_ASSET_AMOUNT};
pub use name::Name;
pub use scalar::Scalar;
pub use symbol::{Symbol, SymbolCode, MAX_PRECISION};
pub use time::{Clock, FixedClock, SystemClock, TimePointSec};

/// Errors produced while parsing the textual forms of the value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid name `{0}`")]
    InvalidName(String),

    #[error("invalid symbol code `{0}`")]
    InvalidSymbolCode(String),

    #[error("invalid symbol `{0}`")]
    InvalidSymbol(String),

    #[error("precision {0} exceeds 18")]
    PrecisionTooLarge(u8),

    #[error("invalid asset `{0}`")]
    InvalidAsset(String),

    #[error("asset amount out of range in `{0}`")]
    AmountOutOfRange(String),

    #[error("invalid scalar `{0}`")]
    InvalidScalar(String),

    #[error("scalar `{0}` has more than 8 decimal places")]
    TooManyDecimals(String),

    #[error("invalid time point `{0}`")]
    InvalidTime(String),
}
