use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseError;

/// Seconds since the Unix epoch, the resolution of on-chain block time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimePointSec(u64);

impl TimePointSec {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn secs(self) -> u64 {
        self.0
    }

    /// Seconds elapsed since `anchor`, or `None` if this point precedes it.
    pub fn since(self, anchor: TimePointSec) -> Option<u64> {
        self.0.checked_sub(anchor.0)
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Accepts either raw seconds (`1577836800`) or RFC 3339 (`2020-01-01T00:00:00Z`).
impl FromStr for TimePointSec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(secs) = s.parse::<u64>() {
            return Ok(Self(secs));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|_| ParseError::InvalidTime(s.to_string()))?;
        u64::try_from(dt.timestamp())
            .map(Self)
            .map_err(|_| ParseError::InvalidTime(s.to_string()))
    }
}

/// Source of the current block time.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> TimePointSec;
}

/// Wall-clock time from the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimePointSec {
        TimePointSec(u64::try_from(Utc::now().timestamp()).unwrap_or(0))
    }
}

/// A clock pinned to one instant, for replaying a specific block time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub TimePointSec);

impl Clock for FixedClock {
    fn now(&self) -> TimePointSec {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_point_parse_and_display() {
        let t: TimePointSec = "1577836800".parse().unwrap();
        assert_eq!(t.to_string(), "2020-01-01T00:00:00Z");

        let r: TimePointSec = "2020-01-01T00:05:00Z".parse().unwrap();
        assert_eq!(r.secs(), 1_577_837_100);
        assert!("yesterday".parse::<TimePointSec>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for secs in [0, 1_577_836_800, 1_577_837_103, 4_102_444_800] {
            let t = TimePointSec::from_secs(secs);
            assert_eq!(t.to_string().parse::<TimePointSec>().unwrap(), t);
        }
    }

    #[test]
    fn test_since_anchor() {
        let anchor = TimePointSec::from_secs(1_000);
        assert_eq!(TimePointSec::from_secs(1_300).since(anchor), Some(300));
        assert_eq!(TimePointSec::from_secs(999).since(anchor), None);
    }

    #[test]
    fn test_clocks() {
        let fixed = FixedClock(TimePointSec::from_secs(42));
        assert_eq!(fixed.now().secs(), 42);
        // Any host clock is well past 2020.
        assert!(SystemClock.now().secs() > 1_577_836_800);
    }
}
