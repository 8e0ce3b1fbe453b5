/// DFS total fee (trade + protocol), in basis points.
pub const TOTAL_FEE_BPS: u8 = 30;

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Get the DFS total fee in basis points.
///
/// ```
/// let fee = dfs_rewards::dfs::get_fee();
/// assert_eq!(fee, 30); // 0.30%
/// ```
pub fn get_fee() -> u8 {
    TOTAL_FEE_BPS
}
