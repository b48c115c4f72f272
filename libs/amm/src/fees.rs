//! Fee schedule for swaps and withdrawals
//!
//! Trade fees stay in the reserves and raise the value of every share. Owner
//! trade fees are re-issued as pool shares to the fee collector, with a host
//! portion split off when a host collector is present. Withdrawal fees are
//! charged in pool shares. Every fee rounds in the pool's favour.

use crate::error::{Result, SwapError};
use crate::math::{ceil_div, floor_div, mul_div_ceil, to_u64};
use serde::{Deserialize, Serialize};

/// Rational fee rates carried on each pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    /// Trade fee, retained in the reserves
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    /// Owner trade fee, re-issued to the fee collector as pool shares
    pub owner_trade_fee_numerator: u64,
    pub owner_trade_fee_denominator: u64,
    /// Owner withdraw fee, charged in pool shares on every withdrawal
    pub owner_withdraw_fee_numerator: u64,
    pub owner_withdraw_fee_denominator: u64,
    /// Host fee, a proportion of the owner trade fee
    pub host_fee_numerator: u64,
    pub host_fee_denominator: u64,
}

/// Split of a gross swap amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub trade_fee: u64,
    /// Total owner trade fee, host portion included
    pub owner_fee: u64,
    /// Host portion of `owner_fee`
    pub host_fee: u64,
    /// Amount routed through the curve
    pub net_amount: u64,
}

impl FeeBreakdown {
    /// Owner fee left for the pool fee collector after the host split
    #[inline]
    pub fn collector_fee(&self) -> u64 {
        self.owner_fee - self.host_fee
    }

    /// Trade fee plus owner fee
    #[inline]
    pub fn total_fees(&self) -> u64 {
        self.trade_fee + self.owner_fee
    }
}

#[inline]
fn validate_fraction(fee: &'static str, numerator: u64, denominator: u64) -> Result<()> {
    if denominator == 0 || numerator > denominator {
        return Err(SwapError::InvalidFeeConfiguration {
            fee,
            numerator,
            denominator,
        });
    }
    Ok(())
}

/// `ceil(amount * numerator / denominator)`
#[inline]
fn ceil_fee(amount: u64, numerator: u64, denominator: u64) -> Result<u64> {
    if numerator == 0 {
        return Ok(0);
    }
    to_u64(mul_div_ceil(
        amount as u128,
        numerator as u128,
        denominator as u128,
    )?)
}

impl Fees {
    /// Fee-free schedule, useful for pools that only exercise the curve
    pub const fn zero() -> Self {
        Self {
            trade_fee_numerator: 0,
            trade_fee_denominator: 1,
            owner_trade_fee_numerator: 0,
            owner_trade_fee_denominator: 1,
            owner_withdraw_fee_numerator: 0,
            owner_withdraw_fee_denominator: 1,
            host_fee_numerator: 0,
            host_fee_denominator: 1,
        }
    }

    /// Check every rate has a non-zero denominator and does not exceed 100%
    pub fn validate(&self) -> Result<()> {
        validate_fraction("trade", self.trade_fee_numerator, self.trade_fee_denominator)?;
        validate_fraction(
            "owner trade",
            self.owner_trade_fee_numerator,
            self.owner_trade_fee_denominator,
        )?;
        validate_fraction(
            "owner withdraw",
            self.owner_withdraw_fee_numerator,
            self.owner_withdraw_fee_denominator,
        )?;
        validate_fraction("host", self.host_fee_numerator, self.host_fee_denominator)?;
        Ok(())
    }

    /// Trade fee in trading tokens
    #[inline]
    pub fn trading_fee(&self, amount: u64) -> Result<u64> {
        ceil_fee(amount, self.trade_fee_numerator, self.trade_fee_denominator)
    }

    /// Owner trade fee in trading tokens
    #[inline]
    pub fn owner_trading_fee(&self, amount: u64) -> Result<u64> {
        ceil_fee(
            amount,
            self.owner_trade_fee_numerator,
            self.owner_trade_fee_denominator,
        )
    }

    /// Host share of an owner fee, rounded down
    #[inline]
    pub fn host_fee(&self, owner_fee: u64) -> Result<u64> {
        if self.host_fee_numerator == 0 {
            return Ok(0);
        }
        let product = (owner_fee as u128) * (self.host_fee_numerator as u128);
        to_u64(floor_div(product, self.host_fee_denominator as u128)?)
    }

    /// Withdraw fee in pool shares
    #[inline]
    pub fn owner_withdraw_fee(&self, pool_tokens: u64) -> Result<u64> {
        ceil_fee(
            pool_tokens,
            self.owner_withdraw_fee_numerator,
            self.owner_withdraw_fee_denominator,
        )
    }

    /// Trade fee on the synthetic half-swap of a single-sided deposit
    ///
    /// Only half the source amount is conceptually swapped, so the fee is
    /// `ceil(amount * trade_num / (2 * trade_den))`.
    pub fn half_trading_fee(&self, amount: u64) -> Result<u64> {
        if self.trade_fee_numerator == 0 {
            return Ok(0);
        }
        let denominator = (self.trade_fee_denominator as u128) * 2;
        to_u64(mul_div_ceil(
            amount as u128,
            self.trade_fee_numerator as u128,
            denominator,
        )?)
    }

    /// Smallest gross amount whose trade-fee-net covers `post_fee_amount`
    ///
    /// `ceil(post * den / (den - num))`; a 100% trade fee has no finite
    /// pre-fee amount and fails with `DivisionByZero`.
    pub fn pre_trading_fee_amount(&self, post_fee_amount: u64) -> Result<u64> {
        if self.trade_fee_numerator == 0 || post_fee_amount == 0 {
            return Ok(post_fee_amount);
        }
        let denominator = self
            .trade_fee_denominator
            .checked_sub(self.trade_fee_numerator)
            .ok_or(SwapError::CalculationOverflow)?;
        let numerator = (post_fee_amount as u128) * (self.trade_fee_denominator as u128);
        to_u64(ceil_div(numerator, denominator as u128)?)
    }

    /// Split a gross swap amount into trade fee, owner fee, host fee and the
    /// net amount priced by the curve
    pub fn apply(&self, amount_in: u64, has_host_collector: bool) -> Result<FeeBreakdown> {
        let trade_fee = self.trading_fee(amount_in)?;
        let owner_fee = self.owner_trading_fee(amount_in)?;
        let fees = trade_fee
            .checked_add(owner_fee)
            .ok_or(SwapError::CalculationOverflow)?;
        let net_amount = amount_in
            .checked_sub(fees)
            .ok_or(SwapError::FeeExceedsAmount {
                fees,
                amount: amount_in,
            })?;
        let host_fee = if has_host_collector {
            self.host_fee(owner_fee)?
        } else {
            0
        };
        Ok(FeeBreakdown {
            trade_fee,
            owner_fee,
            host_fee,
            net_amount,
        })
    }
}
