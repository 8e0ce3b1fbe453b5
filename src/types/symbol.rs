//! Token symbols: a code of up to 7 upper-case letters plus a decimal precision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseError;

/// Largest precision an asset may carry.
pub const MAX_PRECISION: u8 = 18;

/// Symbol code packed little-endian into a `u64`, one ASCII letter per byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolCode(u64);

impl SymbolCode {
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// For compile-time constants whose packing is known to be valid.
    pub(crate) const fn new_unchecked(raw: u64) -> Self {
        SymbolCode(raw)
    }

    pub fn from_raw(raw: u64) -> Result<Self, ParseError> {
        let code = SymbolCode(raw);
        if code.is_valid() {
            Ok(code)
        } else {
            Err(ParseError::InvalidSymbolCode(format!("{raw:#x}")))
        }
    }

    /// At least one letter, only `A-Z`, and no gaps between letters.
    pub fn is_valid(self) -> bool {
        let mut sym = self.0;
        if sym == 0 {
            return false;
        }
        for i in 0..7 {
            let c = (sym & 0xff) as u8;
            if !c.is_ascii_uppercase() {
                return false;
            }
            sym >>= 8;
            if sym == 0 {
                return true;
            }
            if i == 6 {
                return false;
            }
        }
        false
    }

    fn letters(self) -> impl Iterator<Item = char> {
        let raw = self.0;
        (0..7)
            .map(move |i| ((raw >> (8 * i)) & 0xff) as u8)
            .take_while(|&c| c != 0)
            .map(char::from)
    }
}

impl FromStr for SymbolCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() > 7 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(ParseError::InvalidSymbolCode(s.to_string()));
        }

        let raw = bytes
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &c)| acc | (u64::from(c) << (8 * i)));
        Ok(SymbolCode(raw))
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.letters().try_for_each(|c| write!(f, "{c}"))
    }
}

impl TryFrom<String> for SymbolCode {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SymbolCode> for String {
    fn from(code: SymbolCode) -> Self {
        code.to_string()
    }
}

/// A token symbol such as `4,EOS`.
///
/// Two symbols are equal only when both the code and the precision match,
/// the same rule the on-chain `symbol` type applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    code: SymbolCode,
    precision: u8,
}

impl Symbol {
    pub fn new(code: SymbolCode, precision: u8) -> Result<Self, ParseError> {
        if precision > MAX_PRECISION {
            return Err(ParseError::PrecisionTooLarge(precision));
        }
        Ok(Self { code, precision })
    }

    pub(crate) const fn new_unchecked(code: SymbolCode, precision: u8) -> Self {
        Self { code, precision }
    }

    pub fn code(&self) -> SymbolCode {
        self.code
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Packed form used on chain: code in the upper 56 bits, precision in the low byte.
    pub fn raw(&self) -> u64 {
        (self.code.raw() << 8) | u64::from(self.precision)
    }
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (precision, code) = s
            .split_once(',')
            .ok_or_else(|| ParseError::InvalidSymbol(s.to_string()))?;
        let precision: u8 = precision
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidSymbol(s.to_string()))?;
        Symbol::new(code.trim().parse()?, precision)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.to_string()
    }
}
