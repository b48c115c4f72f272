//! Curve calculator interface shared by every pricing formula

use crate::error::{Result, SwapError};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Direction of a trade through the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Input token A, output token B
    AtoB,
    /// Input token B, output token A
    BtoA,
}

impl TradeDirection {
    #[inline]
    pub fn opposite(self) -> TradeDirection {
        match self {
            TradeDirection::AtoB => TradeDirection::BtoA,
            TradeDirection::BtoA => TradeDirection::AtoB,
        }
    }
}

/// Rounding applied to a conversion result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundDirection {
    /// 1.9 => 1
    Floor,
    /// 1.1 => 2
    Ceiling,
}

/// Trading token amounts for a given number of pool shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingTokenResult {
    pub token_a_amount: u128,
    pub token_b_amount: u128,
}

/// Result of pricing a swap with fees already removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapWithoutFeesResult {
    pub source_amount_swapped: u128,
    pub destination_amount_swapped: u128,
}

/// Pricing formula of a pool
///
/// Each curve shape is one implementation. Amounts are passed as `u128` so a
/// curve can widen `u64` ledger amounts without intermediate casts; results
/// are narrowed back by the operation layer.
pub trait CurveCalculator: Debug + Send + Sync {
    /// Destination amount for `source_amount` of source token, fees excluded
    fn swap_without_fees(
        &self,
        source_amount: u128,
        swap_source_amount: u128,
        swap_destination_amount: u128,
        trade_direction: TradeDirection,
    ) -> Result<SwapWithoutFeesResult>;

    /// Share supply issued by the first deposit
    fn new_pool_supply(&self, token_a_amount: u64, token_b_amount: u64) -> Result<u128>;

    /// Trading token amounts backing `pool_tokens` out of `pool_token_supply`
    fn pool_tokens_to_trading_tokens(
        &self,
        pool_tokens: u128,
        pool_token_supply: u128,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
        round_direction: RoundDirection,
    ) -> Result<TradingTokenResult>;

    /// Pool shares for depositing `source_amount` of one side only, fees
    /// excluded. Rounds down.
    ///
    /// Equivalent to swapping part of the source for the other side and
    /// depositing both proportionally, which moves the spot price.
    fn deposit_single_token_type(
        &self,
        source_amount: u128,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
        pool_supply: u128,
        trade_direction: TradeDirection,
    ) -> Result<u128>;

    /// Pool shares that must be redeemed to withdraw exactly
    /// `destination_amount` of one side, fees excluded
    fn withdraw_single_token_type_exact_out(
        &self,
        destination_amount: u128,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
        pool_supply: u128,
        trade_direction: TradeDirection,
        round_direction: RoundDirection,
    ) -> Result<u128>;

    /// Validate curve parameters
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Validate the reserves supplied at initialization
    fn validate_supply(&self, token_a_amount: u64, token_b_amount: u64) -> Result<()> {
        if token_a_amount == 0 || token_b_amount == 0 {
            return Err(SwapError::ZeroTradingTokens);
        }
        Ok(())
    }

    /// Whether deposits are allowed after initialization
    fn allows_deposits(&self) -> bool {
        true
    }

    /// Total value of the reserves normalized to the dimension of one token
    ///
    /// Used to check no trade or liquidity change loses pool value.
    fn normalized_value(&self, swap_token_a_amount: u128, swap_token_b_amount: u128)
        -> Result<u128>;
}

/// Map a trade direction onto `(source_reserve, destination_reserve)`
#[inline]
pub fn source_and_destination(
    swap_token_a_amount: u128,
    swap_token_b_amount: u128,
    trade_direction: TradeDirection,
) -> (u128, u128) {
    match trade_direction {
        TradeDirection::AtoB => (swap_token_a_amount, swap_token_b_amount),
        TradeDirection::BtoA => (swap_token_b_amount, swap_token_a_amount),
    }
}
