use crate::database::TableStore;
use crate::error::{DfsError, Result};
use crate::types::{Asset, Symbol};

/// Get the reserves of market `mid`, with the reserve held in `sort` first.
///
/// Fails with `NotFound` when the market does not exist and with
/// `SortMismatch` when neither reserve is denominated in `sort`.
pub fn get_reserves(store: &dyn TableStore, mid: u64, sort: Symbol) -> Result<(Asset, Asset)> {
    let market = store.require_market(mid)?;

    if market.reserve0.symbol == sort {
        Ok((market.reserve0, market.reserve1))
    } else if market.reserve1.symbol == sort {
        Ok((market.reserve1, market.reserve0))
    } else {
        Err(DfsError::SortMismatch {
            sort,
            reserve0: market.reserve0.symbol,
            reserve1: market.reserve1.symbol,
        })
    }
}
