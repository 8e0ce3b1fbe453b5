//! Table layer: row types of the external DFS tables and a pluggable store.
//!
//! The reward engine only ever sees `&dyn TableStore`, so a node-backed
//! reader can replace `MemoryTableStore` without touching the engine.

pub mod memory;
pub mod tables;

pub use memory::MemoryTableStore;
pub use tables::{
    EggParamsRow, MarketRow, RankedPoolRow, TableSnapshot, TableStore, EGG_PARAMS_TABLE,
    MARKETS_TABLE, RANKED_POOLS_TABLE,
};
