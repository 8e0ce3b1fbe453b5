//! Row types of the DFS tables and the lookup API over them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{DfsError, Result};
use crate::types::{Asset, Name, Scalar, Symbol, TimePointSec};

pub const MARKETS_TABLE: &str = "markets";
pub const EGG_PARAMS_TABLE: &str = "eggargs";
pub const RANKED_POOLS_TABLE: &str = "pools";

/// One row of the swap contract's `markets` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketRow {
    pub mid: u64,
    #[serde(default)]
    pub contract0: Name,
    #[serde(default)]
    pub contract1: Name,
    pub sym0: Symbol,
    pub sym1: Symbol,
    pub reserve0: Asset,
    pub reserve1: Asset,
    #[serde(default)]
    pub liquidity_token: u64,
    /// reserve1 per reserve0 at the last trade.
    pub price0_last: Scalar,
    /// reserve0 per reserve1 at the last trade.
    #[serde(default)]
    pub price1_last: Scalar,
    #[serde(default)]
    pub last_update: TimePointSec,
}

impl MarketRow {
    /// Builds a row whose symbols are taken from the reserves.
    pub fn new(mid: u64, reserve0: Asset, reserve1: Asset, price0_last: Scalar) -> Self {
        Self {
            mid,
            contract0: Name::default(),
            contract1: Name::default(),
            sym0: reserve0.symbol,
            sym1: reserve1.symbol,
            reserve0,
            reserve1,
            liquidity_token: 0,
            price0_last,
            price1_last: Scalar::ZERO,
            last_update: TimePointSec::default(),
        }
    }

    /// The declared symbols must be the ones the reserves are held in.
    pub fn is_consistent(&self) -> bool {
        self.sym0 == self.reserve0.symbol
            && self.sym1 == self.reserve1.symbol
            && self.sym0 != self.sym1
            && self.reserve0.is_valid()
            && self.reserve1.is_valid()
    }
}

/// Per-market lucky-egg promotion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EggParamsRow {
    pub mid: u64,
    pub time_gap_minutes: u64,
    pub lucky_discount: Scalar,
    pub trigger_value_max: Asset,
}

/// Externally assigned rank of a market; 0 means unranked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedPoolRow {
    pub mid: u64,
    pub rank: u64,
}

/// Read-only point lookups against the tables the reward calculation depends on.
///
/// Implementations return the store's current value on every call; callers
/// never cache rows across calls.
pub trait TableStore: fmt::Debug + Send + Sync {
    fn market(&self, mid: u64) -> Result<Option<MarketRow>>;

    fn egg_params(&self, mid: u64) -> Result<Option<EggParamsRow>>;

    fn ranked_pool(&self, mid: u64) -> Result<Option<RankedPoolRow>>;

    /// Like [`TableStore::market`] but a missing row is a `NotFound` fault.
    fn require_market(&self, mid: u64) -> Result<MarketRow> {
        self.market(mid)?.ok_or(DfsError::NotFound {
            table: MARKETS_TABLE,
            key: mid,
        })
    }
}

/// All rows of the three tables, as loaded from or dumped to JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSnapshot {
    #[serde(default)]
    pub markets: Vec<MarketRow>,
    #[serde(default)]
    pub egg_params: Vec<EggParamsRow>,
    #[serde(default)]
    pub ranked_pools: Vec<RankedPoolRow>,
}

impl TableSnapshot {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| DfsError::Parse(e.to_string()))
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| DfsError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_row_consistency() {
        let row = MarketRow::new(
            17,
            "4585193.1234 EOS".parse().unwrap(),
            "12568203.3533 USDT".parse().unwrap(),
            "2.741".parse().unwrap(),
        );
        assert!(row.is_consistent());

        let mut bad = row.clone();
        bad.sym0 = "8,EOS".parse().unwrap();
        assert!(!bad.is_consistent());

        let mut same = row;
        same.reserve1 = "1.0000 EOS".parse().unwrap();
        same.sym1 = same.reserve1.symbol;
        assert!(!same.is_consistent());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "markets": [{
                "mid": 17,
                "contract0": "eosio.token",
                "contract1": "tethertether",
                "sym0": "4,EOS",
                "sym1": "4,USDT",
                "reserve0": "4585193.1234 EOS",
                "reserve1": "12568203.3533 USDT",
                "liquidity_token": 0,
                "price0_last": 2.741,
                "last_update": 1577836800
            }],
            "ranked_pools": [{ "mid": 17, "rank": 5 }]
        }"#;
        let snapshot: TableSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.markets.len(), 1);
        assert!(snapshot.egg_params.is_empty());
        let market = &snapshot.markets[0];
        assert_eq!(market.contract1.to_string(), "tethertether");
        assert_eq!(market.price0_last.raw(), 274_100_000);
        assert_eq!(market.price1_last, Scalar::ZERO);
        assert_eq!(snapshot.ranked_pools[0].rank, 5);
    }

    #[test]
    fn test_snapshot_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");

        let snapshot = TableSnapshot {
            egg_params: vec![EggParamsRow {
                mid: 12,
                time_gap_minutes: 10,
                lucky_discount: "0.5".parse().unwrap(),
                trigger_value_max: "100.0000 EOS".parse().unwrap(),
            }],
            ..TableSnapshot::default()
        };
        snapshot.to_json_file(&path).unwrap();
        assert_eq!(TableSnapshot::from_json_file(&path).unwrap(), snapshot);
    }

    #[test]
    fn test_demo_snapshot_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/tables.json");
        let snapshot = TableSnapshot::from_json_file(&path).unwrap();
        assert_eq!(snapshot.markets.len(), 2);
        assert!(snapshot.markets.iter().all(MarketRow::is_consistent));
        assert_eq!(snapshot.egg_params[0].trigger_value_max.to_string(), "100.0000 EOS");
    }
}
