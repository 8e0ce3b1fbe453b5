//! The three DFS queries: total fee, sorted reserves, and trade rewards.

pub mod fee;
pub mod reserves;
pub mod rewards;

pub use fee::{get_fee, TOTAL_FEE_BPS};
pub use reserves::get_reserves;
pub use rewards::{reward_amount, IneligibleReason, RewardBranch, RewardEngine, RewardQuote};
