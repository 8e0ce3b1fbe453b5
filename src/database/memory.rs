//! In-memory table store, used by the CLI over a JSON snapshot and by tests.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::tables::{EggParamsRow, MarketRow, RankedPoolRow, TableSnapshot, TableStore};
use crate::error::{DfsError, Result};

#[derive(Debug, Default)]
pub struct MemoryTableStore {
    markets: RwLock<HashMap<u64, MarketRow>>,
    egg_params: RwLock<HashMap<u64, EggParamsRow>>,
    ranked_pools: RwLock<HashMap<u64, RankedPoolRow>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: TableSnapshot) -> Result<Self> {
        let store = Self::new();
        for row in snapshot.markets {
            store.upsert_market(row)?;
        }
        for row in snapshot.egg_params {
            store.upsert_egg_params(row);
        }
        for row in snapshot.ranked_pools {
            store.upsert_ranked_pool(row);
        }
        Ok(store)
    }

    /// Insert or replace a market. Rows whose symbols disagree with their
    /// reserves are rejected.
    pub fn upsert_market(&self, row: MarketRow) -> Result<()> {
        if !row.is_consistent() {
            return Err(DfsError::Storage(format!(
                "market {} has inconsistent symbols or reserves",
                row.mid
            )));
        }
        self.markets.write().insert(row.mid, row);
        Ok(())
    }

    pub fn upsert_egg_params(&self, row: EggParamsRow) {
        self.egg_params.write().insert(row.mid, row);
    }

    pub fn upsert_ranked_pool(&self, row: RankedPoolRow) {
        self.ranked_pools.write().insert(row.mid, row);
    }

    pub fn remove_market(&self, mid: u64) -> Option<MarketRow> {
        self.markets.write().remove(&mid)
    }

    pub fn remove_ranked_pool(&self, mid: u64) -> Option<RankedPoolRow> {
        self.ranked_pools.write().remove(&mid)
    }

    pub fn clear(&self) {
        self.markets.write().clear();
        self.egg_params.write().clear();
        self.ranked_pools.write().clear();
    }

    /// Dump every row, ordered by key.
    pub fn snapshot(&self) -> TableSnapshot {
        let mut markets: Vec<_> = self.markets.read().values().cloned().collect();
        markets.sort_by_key(|r| r.mid);
        let mut egg_params: Vec<_> = self.egg_params.read().values().cloned().collect();
        egg_params.sort_by_key(|r| r.mid);
        let mut ranked_pools: Vec<_> = self.ranked_pools.read().values().cloned().collect();
        ranked_pools.sort_by_key(|r| r.mid);

        TableSnapshot {
            markets,
            egg_params,
            ranked_pools,
        }
    }
}

impl TableStore for MemoryTableStore {
    fn market(&self, mid: u64) -> Result<Option<MarketRow>> {
        Ok(self.markets.read().get(&mid).cloned())
    }

    fn egg_params(&self, mid: u64) -> Result<Option<EggParamsRow>> {
        Ok(self.egg_params.read().get(&mid).cloned())
    }

    fn ranked_pool(&self, mid: u64) -> Result<Option<RankedPoolRow>> {
        Ok(self.ranked_pools.read().get(&mid).cloned())
    }
}
