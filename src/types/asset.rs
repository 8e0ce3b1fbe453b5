//! Fixed-point token quantities.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{ParseError, Symbol, SymbolCode};
use crate::error::{DfsError, Result};

/// Largest magnitude an asset amount may hold (`2^62 - 1`).
pub const MAX_ASSET_AMOUNT: i64 = (1 << 62) - 1;

/// A signed amount of base units tagged with its symbol, e.g. `4585193.1234 EOS`
/// is `amount = 45_851_931_234` with symbol `4,EOS`.
///
/// Arithmetic and ordering are only defined between assets of the same symbol;
/// the checked operations below fault with `CurrencyMismatch` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl Asset {
    pub fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    pub fn zero(symbol: Symbol) -> Self {
        Self { amount: 0, symbol }
    }

    pub fn is_amount_within_range(&self) -> bool {
        (-MAX_ASSET_AMOUNT..=MAX_ASSET_AMOUNT).contains(&self.amount)
    }

    pub fn is_valid(&self) -> bool {
        self.is_amount_within_range() && self.symbol.code().is_valid()
    }

    fn ensure_same_symbol(&self, other: &Asset) -> Result<()> {
        if self.symbol != other.symbol {
            return Err(DfsError::mismatch(self, other));
        }
        Ok(())
    }

    /// Orders two assets of the same symbol.
    pub fn try_cmp(&self, other: &Asset) -> Result<Ordering> {
        self.ensure_same_symbol(other)?;
        Ok(self.amount.cmp(&other.amount))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self.symbol.precision();
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();

        if precision == 0 {
            return write!(f, "{}{} {}", sign, abs, self.symbol.code());
        }

        let unit = 10u64.pow(u32::from(precision));
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            abs / unit,
            abs % unit,
            self.symbol.code(),
            width = usize::from(precision)
        )
    }
}

impl FromStr for Asset {
    type Err = ParseError;

    /// Parses `"<amount> <CODE>"`; the precision is the number of fractional digits.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidAsset(s.to_string());

        let (number, code) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let code: SymbolCode = code.trim().parse()?;

        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() || !int_part.bytes().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if digits.contains('.') && frac_part.is_empty() {
            return Err(invalid());
        }
        if !frac_part.bytes().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let precision = u8::try_from(frac_part.len()).map_err(|_| invalid())?;
        let symbol = Symbol::new(code, precision)?;

        let out_of_range = || ParseError::AmountOutOfRange(s.to_string());
        let mut amount: i64 = 0;
        for c in int_part.bytes().chain(frac_part.bytes()) {
            amount = amount
                .checked_mul(10)
                .and_then(|a| a.checked_add(i64::from(c - b'0')))
                .ok_or_else(out_of_range)?;
        }
        if amount > MAX_ASSET_AMOUNT {
            return Err(out_of_range());
        }
        if negative {
            amount = -amount;
        }

        Ok(Asset::new(amount, symbol))
    }
}

impl TryFrom<String> for Asset {
    type Error = ParseError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}
