//! Unsigned fixed-point scalar with 8 decimal places.
//!
//! Rates and discounts are carried as `Scalar` rather than `f64` so that the
//! reward math is exact and identical on every platform. Floating-point input
//! is accepted only at the deserialization boundary and rounded once there.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ParseError;

pub const SCALAR_DECIMALS: u32 = 8;

/// `10^SCALAR_DECIMALS`
pub const SCALAR_ONE: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Scalar(u64);

impl Scalar {
    pub const ZERO: Scalar = Scalar(0);
    pub const ONE: Scalar = Scalar(SCALAR_ONE);

    /// Builds a scalar from its raw value in units of `1e-8`.
    pub const fn from_raw(raw: u64) -> Self {
        Scalar(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn from_f64(value: f64) -> Result<Self, ParseError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ParseError::InvalidScalar(value.to_string()));
        }
        let scaled = (value * SCALAR_ONE as f64).round();
        if scaled > u64::MAX as f64 {
            return Err(ParseError::InvalidScalar(value.to_string()));
        }
        Ok(Scalar(scaled as u64))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Scalar {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidScalar(s.to_string());
        let s = s.trim();

        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|c| c.is_ascii_digit())
            || !frac_part.bytes().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac_part.len() > SCALAR_DECIMALS as usize {
            return Err(ParseError::TooManyDecimals(s.to_string()));
        }

        let whole: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut frac: u64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| invalid())?
        };
        frac *= 10u64.pow(SCALAR_DECIMALS - frac_part.len() as u32);

        whole
            .checked_mul(SCALAR_ONE)
            .and_then(|w| w.checked_add(frac))
            .map(Scalar)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALAR_ONE;
        let frac = self.0 % SCALAR_ONE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:08}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts `"0.05"` as well as a bare JSON / TOML number.
impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(u64),
            Float(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Int(n) => n
                .checked_mul(SCALAR_ONE)
                .map(Scalar)
                .ok_or_else(|| serde::de::Error::custom("scalar out of range")),
            Raw::Float(v) => Scalar::from_f64(v).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_parse() {
        assert_eq!("0.05".parse::<Scalar>().unwrap().raw(), 5_000_000);
        assert_eq!("0.050".parse::<Scalar>().unwrap().raw(), 5_000_000);
        assert_eq!("1".parse::<Scalar>().unwrap(), Scalar::ONE);
        assert_eq!(".2".parse::<Scalar>().unwrap().raw(), 20_000_000);
        assert_eq!("2.".parse::<Scalar>().unwrap().raw(), 200_000_000);
        assert_eq!("0.00000001".parse::<Scalar>().unwrap().raw(), 1);
    }

    #[test]
    fn test_scalar_parse_errors() {
        assert!("".parse::<Scalar>().is_err());
        assert!(".".parse::<Scalar>().is_err());
        assert!("-0.5".parse::<Scalar>().is_err());
        assert!("1e5".parse::<Scalar>().is_err());
        assert!(matches!(
            "0.000000001".parse::<Scalar>(),
            Err(ParseError::TooManyDecimals(_))
        ));
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from_raw(5_000_000).to_string(), "0.05");
        assert_eq!(Scalar::ONE.to_string(), "1");
        assert_eq!(Scalar::from_raw(123_456_789).to_string(), "1.23456789");
        assert_eq!(Scalar::ZERO.to_string(), "0");
    }

    #[test]
    fn test_scalar_deserialize_forms() {
        let from_text: Scalar = serde_json::from_str("\"0.2\"").unwrap();
        let from_float: Scalar = serde_json::from_str("0.2").unwrap();
        let from_int: Scalar = serde_json::from_str("3").unwrap();
        assert_eq!(from_text, from_float);
        assert_eq!(from_int.raw(), 300_000_000);
        assert!(serde_json::from_str::<Scalar>("-1.5").is_err());
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"0.2\"");
    }
}
