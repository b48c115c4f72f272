//! Swap curves and the fee-aware wrapper used by pool operations
//!
//! A [`CurveCalculator`] prices trades with no knowledge of fees. [`SwapCurve`]
//! combines a calculator with a pool's [`Fees`] and narrows the results back
//! to ledger-width amounts.

pub mod calculator;
pub mod constant_product;

pub use calculator::{
    CurveCalculator, RoundDirection, SwapWithoutFeesResult, TradeDirection, TradingTokenResult,
};
pub use constant_product::ConstantProductCurve;

use crate::error::{Result, SwapError};
use crate::fees::{FeeBreakdown, Fees};
use crate::math::to_u64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Curve family tag stored on each pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CurveKind {
    /// `reserve_a * reserve_b = k`
    #[default]
    ConstantProduct,
}

impl CurveKind {
    /// Calculator implementing this curve family
    pub fn calculator(self) -> Box<dyn CurveCalculator> {
        match self {
            CurveKind::ConstantProduct => Box::new(ConstantProductCurve),
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveKind::ConstantProduct => write!(f, "constant_product"),
        }
    }
}

/// Result of a fee-inclusive swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub fees: FeeBreakdown,
    /// Destination tokens paid to the trader
    pub amount_out: u64,
    /// Source reserve after receiving the full gross input
    pub new_source_reserve: u64,
    pub new_destination_reserve: u64,
}

/// Curve plus fee handling
#[derive(Debug)]
pub struct SwapCurve {
    pub kind: CurveKind,
    pub calculator: Box<dyn CurveCalculator>,
}

impl SwapCurve {
    pub fn new(kind: CurveKind) -> Self {
        Self {
            kind,
            calculator: kind.calculator(),
        }
    }

    /// Price a swap of `amount_in` gross source tokens
    ///
    /// Trade and owner fees are taken off the top, the net amount is priced
    /// by the curve, and the whole gross amount lands in the source reserve.
    pub fn swap(
        &self,
        amount_in: u64,
        swap_source_amount: u64,
        swap_destination_amount: u64,
        trade_direction: TradeDirection,
        fees: &Fees,
        has_host_collector: bool,
    ) -> Result<SwapOutcome> {
        let breakdown = fees.apply(amount_in, has_host_collector)?;
        if breakdown.net_amount == 0 {
            return Err(SwapError::ZeroTradingTokens);
        }
        let priced = self.calculator.swap_without_fees(
            breakdown.net_amount as u128,
            swap_source_amount as u128,
            swap_destination_amount as u128,
            trade_direction,
        )?;
        let amount_out = to_u64(priced.destination_amount_swapped)?;
        let new_source_reserve = swap_source_amount
            .checked_add(amount_in)
            .ok_or(SwapError::CalculationOverflow)?;
        let new_destination_reserve = swap_destination_amount
            .checked_sub(amount_out)
            .ok_or(SwapError::InsufficientLiquidity)?;
        Ok(SwapOutcome {
            fees: breakdown,
            amount_out,
            new_source_reserve,
            new_destination_reserve,
        })
    }

    /// Pool shares for a one-sided deposit with the half-swap trade fee
    /// removed first
    pub fn deposit_single_token_type(
        &self,
        source_amount: u64,
        swap_token_a_amount: u64,
        swap_token_b_amount: u64,
        pool_supply: u64,
        trade_direction: TradeDirection,
        fees: &Fees,
    ) -> Result<u64> {
        if source_amount == 0 {
            return Ok(0);
        }
        let trade_fee = fees.half_trading_fee(source_amount)?;
        let source_amount = source_amount
            .checked_sub(trade_fee)
            .ok_or(SwapError::FeeExceedsAmount {
                fees: trade_fee,
                amount: source_amount,
            })?;
        let shares = self.calculator.deposit_single_token_type(
            source_amount as u128,
            swap_token_a_amount as u128,
            swap_token_b_amount as u128,
            pool_supply as u128,
            trade_direction,
        )?;
        to_u64(shares)
    }

    /// Pool shares to burn for an exact one-sided withdrawal, grossed up for
    /// the trade fee on the synthetic half-swap
    pub fn withdraw_single_token_type_exact_out(
        &self,
        destination_amount: u64,
        swap_token_a_amount: u64,
        swap_token_b_amount: u64,
        pool_supply: u64,
        trade_direction: TradeDirection,
        fees: &Fees,
    ) -> Result<u64> {
        if destination_amount == 0 {
            return Ok(0);
        }
        let half = destination_amount.div_ceil(2);
        let pre_fee_half = fees.pre_trading_fee_amount(half)?;
        let adjusted = (destination_amount - half)
            .checked_add(pre_fee_half)
            .ok_or(SwapError::CalculationOverflow)?;
        let shares = self.calculator.withdraw_single_token_type_exact_out(
            adjusted as u128,
            swap_token_a_amount as u128,
            swap_token_b_amount as u128,
            pool_supply as u128,
            trade_direction,
            RoundDirection::Ceiling,
        )?;
        to_u64(shares)
    }

    /// Pool-share equivalent of a fee paid in one trading token, rounded down
    pub fn fee_to_pool_tokens(
        &self,
        fee_amount: u64,
        swap_token_a_amount: u64,
        swap_token_b_amount: u64,
        pool_supply: u64,
        trade_direction: TradeDirection,
    ) -> Result<u64> {
        let shares = self.calculator.withdraw_single_token_type_exact_out(
            fee_amount as u128,
            swap_token_a_amount as u128,
            swap_token_b_amount as u128,
            pool_supply as u128,
            trade_direction,
            RoundDirection::Floor,
        )?;
        to_u64(shares)
    }
}

impl Default for SwapCurve {
    fn default() -> Self {
        Self::new(CurveKind::default())
    }
}
