use thiserror::Error;

use crate::types::{Asset, Symbol};

#[derive(Error, Debug)]
pub enum DfsError {
    #[error("{table} row not found for key {key}")]
    NotFound { table: &'static str, key: u64 },

    #[error("sort symbol {sort} does not match {reserve0} or {reserve1}")]
    SortMismatch {
        sort: Symbol,
        reserve0: Symbol,
        reserve1: Symbol,
    },

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Symbol, right: Symbol },

    #[error("lucky discount {0} for market {1} exceeds 1")]
    InvalidDiscount(String, u64),

    #[error("reward overflows asset range")]
    Overflow,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DfsError {
    /// Fault raised when two assets of different symbols are compared or combined.
    pub fn mismatch(left: &Asset, right: &Asset) -> Self {
        DfsError::CurrencyMismatch {
            left: left.symbol,
            right: right.symbol,
        }
    }
}

impl From<crate::types::ParseError> for DfsError {
    fn from(error: crate::types::ParseError) -> Self {
        DfsError::Parse(format!("{}", error))
    }
}

impl From<crate::config::ConfigError> for DfsError {
    fn from(error: crate::config::ConfigError) -> Self {
        DfsError::Config(format!("{}", error))
    }
}

pub type Result<T> = std::result::Result<T, DfsError>;
