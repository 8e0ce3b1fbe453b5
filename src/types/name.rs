//! EOSIO account names packed into a `u64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseError;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Up to 12 characters from `.1-5a-z`, plus an optional 13th from `.1-5a-j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(u64);

impl Name {
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

fn char_to_value(c: u8) -> Option<u64> {
    match c {
        b'.' => Some(0),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        _ => None,
    }
}

impl FromStr for Name {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() > 13 {
            return Err(ParseError::InvalidName(s.to_string()));
        }

        let mut value = 0u64;
        for (i, &c) in bytes.iter().enumerate() {
            let v = char_to_value(c).ok_or_else(|| ParseError::InvalidName(s.to_string()))?;
            if i < 12 {
                value |= (v & 0x1f) << (64 - 5 * (i + 1));
            } else {
                // The 13th character only has 4 bits left.
                if v > 0x0f {
                    return Err(ParseError::InvalidName(s.to_string()));
                }
                value |= v;
            }
        }

        Ok(Name(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; 13];
        let mut tmp = self.0;
        for i in 0..13 {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            out[12 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }

        let end = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // CHARMAP is pure ASCII.
        f.write_str(std::str::from_utf8(&out[..end]).map_err(|_| fmt::Error)?)
    }
}

impl TryFrom<String> for Name {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.to_string()
    }
}
