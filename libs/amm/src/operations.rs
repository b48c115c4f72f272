//! Pool operations
//!
//! Each operation takes a pool snapshot and a request and returns either a
//! [`Transition`] (the next snapshot plus the ledger effects that realize it)
//! or a typed error. Nothing is mutated on failure; [`PoolState::execute`]
//! writes the next snapshot back only after the whole computation succeeded.

use crate::constraints::SwapConstraints;
use crate::curve::{RoundDirection, TradeDirection};
use crate::error::{Result, SwapError};
use crate::ledger::{Asset, FeeShares, Party, PoolEffect};
use crate::math::to_u64;
use crate::pool::{PoolState, PoolStatus, TokenSide};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeRequest {
    pub token_a_amount: u64,
    pub token_b_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub direction: TradeDirection,
    /// Gross source amount, fees included
    pub amount_in: u64,
    pub minimum_amount_out: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAllRequest {
    pub pool_token_amount: u64,
    pub maximum_token_a_amount: u64,
    pub maximum_token_b_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawAllRequest {
    /// Shares debited from the user, withdrawal fee included
    pub pool_token_amount: u64,
    pub minimum_token_a_amount: u64,
    pub minimum_token_b_amount: u64,
    /// The fee collector withdrawing its own shares pays no withdrawal fee
    #[serde(default)]
    pub source_is_fee_collector: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSingleRequest {
    pub token: TokenSide,
    pub source_amount: u64,
    pub minimum_pool_token_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawSingleRequest {
    pub token: TokenSide,
    pub destination_amount: u64,
    /// Upper bound on shares debited, withdrawal fee included
    pub maximum_pool_token_amount: u64,
    #[serde(default)]
    pub source_is_fee_collector: bool,
}

/// Any of the six pool operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Initialize(InitializeRequest),
    Swap(SwapRequest),
    DepositAllTokenTypes(DepositAllRequest),
    WithdrawAllTokenTypes(WithdrawAllRequest),
    DepositSingleTokenTypeExactAmountIn(DepositSingleRequest),
    WithdrawSingleTokenTypeExactAmountOut(WithdrawSingleRequest),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Initialize(_) => "initialize",
            Operation::Swap(_) => "swap",
            Operation::DepositAllTokenTypes(_) => "deposit_all_token_types",
            Operation::WithdrawAllTokenTypes(_) => "withdraw_all_token_types",
            Operation::DepositSingleTokenTypeExactAmountIn(_) => {
                "deposit_single_token_type_exact_amount_in"
            }
            Operation::WithdrawSingleTokenTypeExactAmountOut(_) => {
                "withdraw_single_token_type_exact_amount_out"
            }
        }
    }
}

/// Next pool snapshot plus the effect that produces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub pool: PoolState,
    pub effect: PoolEffect,
}

#[inline]
fn token_asset(side: TokenSide) -> Asset {
    match side {
        TokenSide::A => Asset::TokenA,
        TokenSide::B => Asset::TokenB,
    }
}

#[inline]
fn source_side(direction: TradeDirection) -> TokenSide {
    match direction {
        TradeDirection::AtoB => TokenSide::A,
        TradeDirection::BtoA => TokenSide::B,
    }
}

#[inline]
fn add(value: u64, amount: u64) -> Result<u64> {
    value.checked_add(amount).ok_or(SwapError::CalculationOverflow)
}

/// Remaining balance after removing `amount`; emptying it entirely is refused
#[inline]
fn drain(value: u64, amount: u64) -> Result<u64> {
    match value.checked_sub(amount) {
        Some(remaining) if remaining > 0 => Ok(remaining),
        _ => Err(SwapError::InsufficientLiquidity),
    }
}

#[inline]
fn at_least(computed: u64, limit: u64) -> Result<()> {
    if computed < limit {
        return Err(SwapError::ExceededSlippage { computed, limit });
    }
    Ok(())
}

#[inline]
fn at_most(computed: u64, limit: u64) -> Result<()> {
    if computed > limit {
        return Err(SwapError::ExceededSlippage { computed, limit });
    }
    Ok(())
}

#[inline]
fn non_zero(amount: u64) -> Result<u64> {
    if amount == 0 {
        return Err(SwapError::ZeroTradingTokens);
    }
    Ok(amount)
}

fn set_reserve(pool: &mut PoolState, side: TokenSide, value: u64) {
    match side {
        TokenSide::A => pool.reserve_a = value,
        TokenSide::B => pool.reserve_b = value,
    }
}

fn record_reserve_delta(effect: &mut PoolEffect, side: TokenSide, delta: i128) {
    match side {
        TokenSide::A => effect.reserve_a_delta = delta,
        TokenSide::B => effect.reserve_b_delta = delta,
    }
}

/// Fund a fresh pool and mint the initial share supply to the initializer
pub fn initialize(pool: &PoolState, request: &InitializeRequest) -> Result<Transition> {
    initialize_with_constraints(pool, request, None)
}

/// [`initialize`] with deployment constraints on collector, curve and fees
pub fn initialize_with_constraints(
    pool: &PoolState,
    request: &InitializeRequest,
    constraints: Option<&SwapConstraints>,
) -> Result<Transition> {
    if pool.is_initialized() || pool.share_supply != 0 {
        return Err(SwapError::AlreadyInitialized);
    }
    pool.fees.validate()?;
    let curve = pool.swap_curve();
    curve.calculator.validate()?;
    curve
        .calculator
        .validate_supply(request.token_a_amount, request.token_b_amount)?;
    if let Some(constraints) = constraints {
        constraints.validate(pool)?;
    }

    let supply = to_u64(
        curve
            .calculator
            .new_pool_supply(request.token_a_amount, request.token_b_amount)?,
    )?;
    let supply = non_zero(supply)?;

    let mut next = pool.clone();
    next.status = PoolStatus::Initialized;
    next.reserve_a = request.token_a_amount;
    next.reserve_b = request.token_b_amount;
    next.share_supply = supply;

    let mut effect = PoolEffect {
        reserve_a_delta: request.token_a_amount as i128,
        reserve_b_delta: request.token_b_amount as i128,
        share_supply_delta: supply as i128,
        ..Default::default()
    };
    effect.transfer(Asset::TokenA, Party::User, Party::Reserve, request.token_a_amount);
    effect.transfer(Asset::TokenB, Party::User, Party::Reserve, request.token_b_amount);
    effect.mint(Party::User, supply);

    debug!(
        "Initialized {} pool: reserves {}/{}, supply {}",
        next.curve, next.reserve_a, next.reserve_b, supply
    );
    Ok(Transition { pool: next, effect })
}

/// Trade one token for the other
///
/// The full gross input lands in the source reserve. The owner fee (and its
/// host portion) is converted to pool shares at the post-trade reserves and
/// minted to the collectors.
pub fn swap(pool: &PoolState, request: &SwapRequest) -> Result<Transition> {
    pool.require_initialized()?;
    non_zero(request.amount_in)?;

    let direction = request.direction;
    let (source_reserve, destination_reserve) = pool.reserves_for(direction);
    let curve = pool.swap_curve();
    let outcome = curve.swap(
        request.amount_in,
        source_reserve,
        destination_reserve,
        direction,
        &pool.fees,
        pool.host_fee_collector.is_some(),
    )?;
    at_least(outcome.amount_out, request.minimum_amount_out)?;

    let mut next = pool.clone();
    next.set_reserves_for(
        direction,
        outcome.new_source_reserve,
        outcome.new_destination_reserve,
    );

    let owner_shares = curve.fee_to_pool_tokens(
        outcome.fees.collector_fee(),
        next.reserve_a,
        next.reserve_b,
        pool.share_supply,
        direction,
    )?;
    let host_shares = curve.fee_to_pool_tokens(
        outcome.fees.host_fee,
        next.reserve_a,
        next.reserve_b,
        pool.share_supply,
        direction,
    )?;
    let minted = add(owner_shares, host_shares)?;
    next.share_supply = add(pool.share_supply, minted)?;

    let source = source_side(direction);
    let destination = source_side(direction.opposite());
    let mut effect = PoolEffect {
        share_supply_delta: minted as i128,
        fee_shares: FeeShares {
            owner: owner_shares,
            host: host_shares,
        },
        ..Default::default()
    };
    record_reserve_delta(&mut effect, source, request.amount_in as i128);
    record_reserve_delta(&mut effect, destination, -(outcome.amount_out as i128));
    effect.transfer(token_asset(source), Party::User, Party::Reserve, request.amount_in);
    effect.transfer(
        token_asset(destination),
        Party::Reserve,
        Party::User,
        outcome.amount_out,
    );
    effect.mint(Party::FeeCollector(pool.fee_collector), owner_shares);
    if let Some(host) = pool.host_fee_collector {
        effect.mint(Party::HostFeeCollector(host), host_shares);
    }

    debug!(
        "Swap {:?}: in {}, out {}, trade fee {}, owner fee {}, host fee {}, fee shares {}/{}",
        direction,
        request.amount_in,
        outcome.amount_out,
        outcome.fees.trade_fee,
        outcome.fees.owner_fee,
        outcome.fees.host_fee,
        owner_shares,
        host_shares
    );
    Ok(Transition { pool: next, effect })
}

/// Mint an exact number of shares against proportional amounts of both
/// tokens, rounded up
pub fn deposit_all_token_types(
    pool: &PoolState,
    request: &DepositAllRequest,
) -> Result<Transition> {
    pool.require_initialized()?;
    let curve = pool.swap_curve();
    if !curve.calculator.allows_deposits() {
        return Err(SwapError::UnsupportedCurveOperation);
    }
    let pool_tokens = non_zero(request.pool_token_amount)?;

    let amounts = curve.calculator.pool_tokens_to_trading_tokens(
        pool_tokens as u128,
        pool.share_supply as u128,
        pool.reserve_a as u128,
        pool.reserve_b as u128,
        RoundDirection::Ceiling,
    )?;
    let token_a_amount = to_u64(amounts.token_a_amount)?;
    at_most(token_a_amount, request.maximum_token_a_amount)?;
    non_zero(token_a_amount)?;
    let token_b_amount = to_u64(amounts.token_b_amount)?;
    at_most(token_b_amount, request.maximum_token_b_amount)?;
    non_zero(token_b_amount)?;

    let mut next = pool.clone();
    next.reserve_a = add(pool.reserve_a, token_a_amount)?;
    next.reserve_b = add(pool.reserve_b, token_b_amount)?;
    next.share_supply = add(pool.share_supply, pool_tokens)?;

    let mut effect = PoolEffect {
        reserve_a_delta: token_a_amount as i128,
        reserve_b_delta: token_b_amount as i128,
        share_supply_delta: pool_tokens as i128,
        ..Default::default()
    };
    effect.transfer(Asset::TokenA, Party::User, Party::Reserve, token_a_amount);
    effect.transfer(Asset::TokenB, Party::User, Party::Reserve, token_b_amount);
    effect.mint(Party::User, pool_tokens);

    debug!(
        "Deposit all: {} shares for {} A / {} B, supply {}",
        pool_tokens, token_a_amount, token_b_amount, next.share_supply
    );
    Ok(Transition { pool: next, effect })
}

/// Redeem shares for proportional amounts of both tokens, rounded down
///
/// The withdrawal fee is moved to the fee collector and only the remainder
/// is burned and priced.
pub fn withdraw_all_token_types(
    pool: &PoolState,
    request: &WithdrawAllRequest,
) -> Result<Transition> {
    pool.require_initialized()?;
    let pool_tokens = non_zero(request.pool_token_amount)?;
    if pool_tokens > pool.share_supply {
        return Err(SwapError::InsufficientLiquidity);
    }
    let withdraw_fee = if request.source_is_fee_collector {
        0
    } else {
        pool.fees.owner_withdraw_fee(pool_tokens)?
    };
    let burn_amount = pool_tokens
        .checked_sub(withdraw_fee)
        .ok_or(SwapError::CalculationOverflow)?;

    let curve = pool.swap_curve();
    let amounts = curve.calculator.pool_tokens_to_trading_tokens(
        burn_amount as u128,
        pool.share_supply as u128,
        pool.reserve_a as u128,
        pool.reserve_b as u128,
        RoundDirection::Floor,
    )?;
    let token_a_amount = to_u64(amounts.token_a_amount)?;
    at_least(token_a_amount, request.minimum_token_a_amount)?;
    non_zero(token_a_amount)?;
    let token_b_amount = to_u64(amounts.token_b_amount)?;
    at_least(token_b_amount, request.minimum_token_b_amount)?;
    non_zero(token_b_amount)?;

    let mut next = pool.clone();
    next.reserve_a = drain(pool.reserve_a, token_a_amount)?;
    next.reserve_b = drain(pool.reserve_b, token_b_amount)?;
    next.share_supply = drain(pool.share_supply, burn_amount)?;

    let mut effect = PoolEffect {
        reserve_a_delta: -(token_a_amount as i128),
        reserve_b_delta: -(token_b_amount as i128),
        share_supply_delta: -(burn_amount as i128),
        fee_shares: FeeShares {
            owner: withdraw_fee,
            host: 0,
        },
        ..Default::default()
    };
    effect.transfer(
        Asset::PoolShare,
        Party::User,
        Party::FeeCollector(pool.fee_collector),
        withdraw_fee,
    );
    effect.burn(Party::User, burn_amount);
    effect.transfer(Asset::TokenA, Party::Reserve, Party::User, token_a_amount);
    effect.transfer(Asset::TokenB, Party::Reserve, Party::User, token_b_amount);

    debug!(
        "Withdraw all: {} shares (fee {}) for {} A / {} B, supply {}",
        pool_tokens, withdraw_fee, token_a_amount, token_b_amount, next.share_supply
    );
    Ok(Transition { pool: next, effect })
}

/// Deposit an exact amount of one token for as many shares as it buys
pub fn deposit_single_token_type_exact_amount_in(
    pool: &PoolState,
    request: &DepositSingleRequest,
) -> Result<Transition> {
    pool.require_initialized()?;
    let curve = pool.swap_curve();
    if !curve.calculator.allows_deposits() {
        return Err(SwapError::UnsupportedCurveOperation);
    }
    let source_amount = non_zero(request.source_amount)?;

    let pool_tokens = curve.deposit_single_token_type(
        source_amount,
        pool.reserve_a,
        pool.reserve_b,
        pool.share_supply,
        request.token.as_source(),
        &pool.fees,
    )?;
    at_least(pool_tokens, request.minimum_pool_token_amount)?;
    non_zero(pool_tokens)?;

    let mut next = pool.clone();
    set_reserve(&mut next, request.token, add(pool.reserve(request.token), source_amount)?);
    next.share_supply = add(pool.share_supply, pool_tokens)?;

    let mut effect = PoolEffect {
        share_supply_delta: pool_tokens as i128,
        ..Default::default()
    };
    record_reserve_delta(&mut effect, request.token, source_amount as i128);
    effect.transfer(
        token_asset(request.token),
        Party::User,
        Party::Reserve,
        source_amount,
    );
    effect.mint(Party::User, pool_tokens);

    debug!(
        "Deposit single {:?}: {} in for {} shares, supply {}",
        request.token, source_amount, pool_tokens, next.share_supply
    );
    Ok(Transition { pool: next, effect })
}

/// Withdraw an exact amount of one token for the fewest shares that cover it
pub fn withdraw_single_token_type_exact_amount_out(
    pool: &PoolState,
    request: &WithdrawSingleRequest,
) -> Result<Transition> {
    pool.require_initialized()?;
    let destination_amount = non_zero(request.destination_amount)?;
    let curve = pool.swap_curve();

    let burn_amount = curve.withdraw_single_token_type_exact_out(
        destination_amount,
        pool.reserve_a,
        pool.reserve_b,
        pool.share_supply,
        request.token.as_source(),
        &pool.fees,
    )?;
    let burn_amount = non_zero(burn_amount)?;
    let withdraw_fee = if request.source_is_fee_collector {
        0
    } else {
        pool.fees.owner_withdraw_fee(burn_amount)?
    };
    let pool_tokens = add(burn_amount, withdraw_fee)?;
    at_most(pool_tokens, request.maximum_pool_token_amount)?;

    let mut next = pool.clone();
    set_reserve(
        &mut next,
        request.token,
        drain(pool.reserve(request.token), destination_amount)?,
    );
    next.share_supply = drain(pool.share_supply, burn_amount)?;

    let mut effect = PoolEffect {
        share_supply_delta: -(burn_amount as i128),
        fee_shares: FeeShares {
            owner: withdraw_fee,
            host: 0,
        },
        ..Default::default()
    };
    record_reserve_delta(&mut effect, request.token, -(destination_amount as i128));
    effect.transfer(
        Asset::PoolShare,
        Party::User,
        Party::FeeCollector(pool.fee_collector),
        withdraw_fee,
    );
    effect.burn(Party::User, burn_amount);
    effect.transfer(
        token_asset(request.token),
        Party::Reserve,
        Party::User,
        destination_amount,
    );

    debug!(
        "Withdraw single {:?}: {} out for {} shares (fee {}), supply {}",
        request.token, destination_amount, pool_tokens, withdraw_fee, next.share_supply
    );
    Ok(Transition { pool: next, effect })
}

/// Compute the transition for any operation without touching `pool`
pub fn process(pool: &PoolState, operation: &Operation) -> Result<Transition> {
    match operation {
        Operation::Initialize(request) => initialize(pool, request),
        Operation::Swap(request) => swap(pool, request),
        Operation::DepositAllTokenTypes(request) => deposit_all_token_types(pool, request),
        Operation::WithdrawAllTokenTypes(request) => withdraw_all_token_types(pool, request),
        Operation::DepositSingleTokenTypeExactAmountIn(request) => {
            deposit_single_token_type_exact_amount_in(pool, request)
        }
        Operation::WithdrawSingleTokenTypeExactAmountOut(request) => {
            withdraw_single_token_type_exact_amount_out(pool, request)
        }
    }
}

impl PoolState {
    /// Run an operation and commit the next snapshot in place
    ///
    /// On error `self` is left exactly as it was.
    pub fn execute(&mut self, operation: Operation) -> Result<PoolEffect> {
        match process(self, &operation) {
            Ok(Transition { pool, effect }) => {
                debug_assert!(pool.check_invariants().is_ok());
                *self = pool;
                Ok(effect)
            }
            Err(e) => {
                debug!("Rejected {}: {}", operation.name(), e);
                Err(e)
            }
        }
    }
}
