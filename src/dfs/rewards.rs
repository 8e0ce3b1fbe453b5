//! Mining / lucky-egg reward calculation.
//!
//! A trade earns a share of the fee it paid, converted into the reward token
//! at the reference market's last price and scaled by a discount that depends
//! on when the trade happened:
//!
//! - **Lucky**: the first `lucky_window_secs` of every `bucket_secs` bucket
//!   (counted from `epoch_anchor`). The market needs egg params, the bucket
//!   must fall on its `time_gap_minutes` schedule and the trade must not exceed
//!   `trigger_value_max`. Discount = `lucky_discount`.
//! - **Normal**: any other instant. The market must be ranked `1..=max_rank`.
//!   Discount = `normal_discount`.
//!
//! ```text
//! reward = amount_in * fee_bps / 10000 * price0_last * discount * protocol_share
//! ```
//!
//! The product is evaluated exactly and truncated toward zero once, when the
//! integer amount is assigned. A trade that fails a gate gets a zero quote,
//! never an error; errors are reserved for missing reference data and
//! cross-currency comparisons.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::fee::{get_fee, BPS_DENOMINATOR};
use crate::config::RewardConfig;
use crate::database::{TableStore, EGG_PARAMS_TABLE, RANKED_POOLS_TABLE};
use crate::error::{DfsError, Result};
use crate::types::scalar::SCALAR_ONE;
use crate::types::{Asset, Clock, Scalar, Symbol, TimePointSec, MAX_ASSET_AMOUNT};

const SECS_PER_MINUTE: u64 = 60;

/// Why a trade earned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    /// Neither leg, or both legs, are in the base symbol.
    NoBaseLeg,
    NonPositiveTrade,
    NoEggParams,
    /// Lucky bucket, but not one on the market's `time_gap_minutes` schedule.
    OffSchedule,
    AboveTrigger,
    Unranked,
    RankOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardBranch {
    Lucky,
    Normal,
    Ineligible(IneligibleReason),
}

impl fmt::Display for RewardBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardBranch::Lucky => write!(f, "lucky"),
            RewardBranch::Normal => write!(f, "normal"),
            RewardBranch::Ineligible(reason) => write!(f, "ineligible: {:?}", reason),
        }
    }
}

/// Result of a reward query: the payout and the branch that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardQuote {
    pub quantity: Asset,
    pub branch: RewardBranch,
}

impl RewardQuote {
    pub fn ineligible(reward_symbol: Symbol, reason: IneligibleReason) -> Self {
        Self {
            quantity: Asset::zero(reward_symbol),
            branch: RewardBranch::Ineligible(reason),
        }
    }

    pub fn is_lucky(&self) -> bool {
        self.branch == RewardBranch::Lucky
    }

    pub fn is_eligible(&self) -> bool {
        !matches!(self.branch, RewardBranch::Ineligible(_))
    }
}

impl fmt::Display for RewardQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.quantity, self.branch)
    }
}

enum Gate {
    Pass(Scalar),
    Fail(IneligibleReason),
}

/// Computes rewards against a table store and a clock.
///
/// Holds no mutable state; every call reads the tables afresh.
#[derive(Debug)]
pub struct RewardEngine<'a> {
    store: &'a dyn TableStore,
    clock: &'a dyn Clock,
    config: RewardConfig,
}

impl<'a> RewardEngine<'a> {
    pub fn new(store: &'a dyn TableStore, clock: &'a dyn Clock, config: RewardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Reward for a trade happening now.
    pub fn get_rewards(&self, pair_id: u64, trade_in: Asset, trade_out: Asset) -> Result<RewardQuote> {
        self.compute_reward(pair_id, trade_in, trade_out, self.clock.now())
    }

    /// Whether `now` falls inside the lucky window of its bucket.
    /// Instants before the anchor are never lucky.
    pub fn is_lucky_instant(&self, now: TimePointSec) -> bool {
        now.since(self.config.epoch_anchor)
            .is_some_and(|elapsed| elapsed % self.config.bucket_secs < self.config.lucky_window_secs)
    }

    pub fn compute_reward(
        &self,
        pair_id: u64,
        trade_in: Asset,
        trade_out: Asset,
        now: TimePointSec,
    ) -> Result<RewardQuote> {
        let base = self.config.base_symbol;

        // The base-currency leg is the fee basis, whichever side it is on.
        let trade_in = match (trade_in.symbol == base, trade_out.symbol == base) {
            (true, false) => trade_in,
            (false, true) => trade_out,
            _ => return Ok(self.ineligible(pair_id, IneligibleReason::NoBaseLeg)),
        };
        if trade_in.amount <= 0 {
            return Ok(self.ineligible(pair_id, IneligibleReason::NonPositiveTrade));
        }

        let lucky = self.is_lucky_instant(now);
        let gate = match now.since(self.config.epoch_anchor) {
            Some(elapsed) if lucky => self.lucky_gate(pair_id, &trade_in, elapsed)?,
            _ => self.normal_gate(pair_id)?,
        };
        let discount = match gate {
            Gate::Pass(discount) => discount,
            Gate::Fail(reason) => return Ok(self.ineligible(pair_id, reason)),
        };

        let rate = self
            .store
            .require_market(self.config.reference_pair_id)?
            .price0_last;

        let amount = reward_amount(
            trade_in.amount,
            u64::from(get_fee()),
            rate,
            discount,
            self.config.protocol_share,
            base.precision(),
            self.config.reward_symbol.precision(),
        )?;

        let quote = RewardQuote {
            quantity: Asset::new(amount, self.config.reward_symbol),
            branch: if lucky {
                RewardBranch::Lucky
            } else {
                RewardBranch::Normal
            },
        };
        log::debug!(
            "pair {}: {} at {} -> {} (rate {}, discount {})",
            pair_id,
            trade_in,
            now,
            quote,
            rate,
            discount
        );
        Ok(quote)
    }

    fn lucky_gate(&self, pair_id: u64, trade_in: &Asset, elapsed: u64) -> Result<Gate> {
        let Some(params) = self.store.egg_params(pair_id)? else {
            log::debug!("pair {}: no row in {}", pair_id, EGG_PARAMS_TABLE);
            return Ok(Gate::Fail(IneligibleReason::NoEggParams));
        };

        let minute = elapsed / SECS_PER_MINUTE;
        if params.time_gap_minutes == 0 || minute % params.time_gap_minutes != 0 {
            return Ok(Gate::Fail(IneligibleReason::OffSchedule));
        }

        if trade_in.try_cmp(&params.trigger_value_max)? == Ordering::Greater {
            return Ok(Gate::Fail(IneligibleReason::AboveTrigger));
        }

        if params.lucky_discount > Scalar::ONE {
            return Err(DfsError::InvalidDiscount(
                params.lucky_discount.to_string(),
                pair_id,
            ));
        }

        Ok(Gate::Pass(params.lucky_discount))
    }

    fn normal_gate(&self, pair_id: u64) -> Result<Gate> {
        let gate = match self.store.ranked_pool(pair_id)? {
            None => {
                log::debug!("pair {}: no row in {}", pair_id, RANKED_POOLS_TABLE);
                Gate::Fail(IneligibleReason::Unranked)
            }
            Some(pool) if pool.rank == 0 => Gate::Fail(IneligibleReason::Unranked),
            Some(pool) if pool.rank > self.config.max_rank => {
                Gate::Fail(IneligibleReason::RankOutOfRange)
            }
            Some(_) => Gate::Pass(self.config.normal_discount),
        };
        Ok(gate)
    }

    fn ineligible(&self, pair_id: u64, reason: IneligibleReason) -> RewardQuote {
        log::debug!("pair {}: no reward ({:?})", pair_id, reason);
        RewardQuote::ineligible(self.config.reward_symbol, reason)
    }
}

/// Exact payout in reward base units, truncated toward zero.
///
/// `trade_amount` is in base-symbol units; the result is rescaled from
/// `base_precision` to `reward_precision` decimals.
pub fn reward_amount(
    trade_amount: i64,
    fee_bps: u64,
    rate: Scalar,
    discount: Scalar,
    protocol_share: Scalar,
    base_precision: u8,
    reward_precision: u8,
) -> Result<i64> {
    let Ok(trade_amount) = u64::try_from(trade_amount) else {
        return Ok(0);
    };

    let mut numerator = BigUint::from(trade_amount)
        * BigUint::from(fee_bps)
        * BigUint::from(rate.raw())
        * BigUint::from(discount.raw())
        * BigUint::from(protocol_share.raw());
    let mut denominator = BigUint::from(BPS_DENOMINATOR) * BigUint::from(SCALAR_ONE).pow(3);

    let ten = BigUint::from(10u32);
    match reward_precision.cmp(&base_precision) {
        Ordering::Greater => numerator *= ten.pow(u32::from(reward_precision - base_precision)),
        Ordering::Less => denominator *= ten.pow(u32::from(base_precision - reward_precision)),
        Ordering::Equal => {}
    }

    (numerator / denominator)
        .to_i64()
        .filter(|amount| *amount <= MAX_ASSET_AMOUNT)
        .ok_or(DfsError::Overflow)
}
