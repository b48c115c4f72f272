//! Constant product curve, `reserve_a * reserve_b = k`
//!
//! All rounding favours the pool: swap outputs and withdrawals floor,
//! proportional deposits ceil. Single-sided conversions use the two-token,
//! equal-weight Balancer formulas evaluated in 256-bit integers.

use super::calculator::{
    source_and_destination, CurveCalculator, RoundDirection, SwapWithoutFeesResult,
    TradeDirection, TradingTokenResult,
};
use crate::error::{Result, SwapError};
use crate::math::{
    ceil_div_u256, ceil_sqrt_u256, integer_sqrt, integer_sqrt_u256, mul_div_ceil,
    mul_div_floor, to_u128,
};
use primitive_types::U256;

/// Uniswap-style invariant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantProductCurve;

/// Destination amount for `source_amount` against the given reserves
///
/// `floor(destination * source / (source_reserve + source))`
pub fn swap(
    source_amount: u128,
    swap_source_amount: u128,
    swap_destination_amount: u128,
) -> Result<SwapWithoutFeesResult> {
    if source_amount == 0 {
        return Err(SwapError::ZeroTradingTokens);
    }
    let new_swap_source_amount = swap_source_amount
        .checked_add(source_amount)
        .ok_or(SwapError::CalculationOverflow)?;
    if new_swap_source_amount == 0 {
        return Err(SwapError::ZeroTradingTokens);
    }
    let destination_amount_swapped =
        mul_div_floor(swap_destination_amount, source_amount, new_swap_source_amount)?;
    if destination_amount_swapped == 0 {
        return Err(SwapError::ZeroTradingTokens);
    }
    Ok(SwapWithoutFeesResult {
        source_amount_swapped: source_amount,
        destination_amount_swapped,
    })
}

/// Proportional share of each reserve
pub fn pool_tokens_to_trading_tokens(
    pool_tokens: u128,
    pool_token_supply: u128,
    swap_token_a_amount: u128,
    swap_token_b_amount: u128,
    round_direction: RoundDirection,
) -> Result<TradingTokenResult> {
    let convert: fn(u128, u128, u128) -> Result<u128> = match round_direction {
        RoundDirection::Floor => mul_div_floor,
        RoundDirection::Ceiling => mul_div_ceil,
    };
    Ok(TradingTokenResult {
        token_a_amount: convert(swap_token_a_amount, pool_tokens, pool_token_supply)?,
        token_b_amount: convert(swap_token_b_amount, pool_tokens, pool_token_supply)?,
    })
}

/// `supply^2 * numerator / reserve` as a 256-bit value
fn scaled_supply_squared(
    pool_supply: u128,
    numerator: u128,
    reserve: u128,
    round_direction: RoundDirection,
) -> Result<U256> {
    let supply = U256::from(pool_supply);
    let product = supply
        .checked_mul(supply)
        .and_then(|squared| squared.checked_mul(U256::from(numerator)))
        .ok_or(SwapError::CalculationOverflow)?;
    let reserve = U256::from(reserve);
    match round_direction {
        RoundDirection::Floor => {
            if reserve.is_zero() {
                return Err(SwapError::DivisionByZero);
            }
            Ok(product / reserve)
        }
        RoundDirection::Ceiling => ceil_div_u256(product, reserve),
    }
}

/// Pool shares for a one-sided deposit, rounded down
///
/// `supply * (sqrt(1 + source / reserve) - 1)`, evaluated as
/// `isqrt(supply^2 * (reserve + source) / reserve) - supply`.
pub fn deposit_single_token_type(
    source_amount: u128,
    swap_token_a_amount: u128,
    swap_token_b_amount: u128,
    pool_supply: u128,
    trade_direction: TradeDirection,
) -> Result<u128> {
    if source_amount == 0 {
        return Ok(0);
    }
    let (swap_source_amount, _) =
        source_and_destination(swap_token_a_amount, swap_token_b_amount, trade_direction);
    let grown_reserve = swap_source_amount
        .checked_add(source_amount)
        .ok_or(SwapError::CalculationOverflow)?;
    let radicand = scaled_supply_squared(
        pool_supply,
        grown_reserve,
        swap_source_amount,
        RoundDirection::Floor,
    )?;
    let root = to_u128(integer_sqrt_u256(radicand))?;
    root.checked_sub(pool_supply)
        .ok_or(SwapError::CalculationOverflow)
}

/// Pool shares redeemed by a one-sided exact-out withdrawal
///
/// `supply * (1 - sqrt(1 - destination / reserve))`, evaluated as
/// `supply - sqrt(supply^2 * (reserve - destination) / reserve)` with the
/// inner terms rounded so the outer result follows `round_direction`.
pub fn withdraw_single_token_type_exact_out(
    destination_amount: u128,
    swap_token_a_amount: u128,
    swap_token_b_amount: u128,
    pool_supply: u128,
    trade_direction: TradeDirection,
    round_direction: RoundDirection,
) -> Result<u128> {
    if destination_amount == 0 {
        return Ok(0);
    }
    let (swap_destination_reserve, _) =
        source_and_destination(swap_token_a_amount, swap_token_b_amount, trade_direction);
    if destination_amount >= swap_destination_reserve {
        return Err(SwapError::InsufficientLiquidity);
    }
    let remaining_reserve = swap_destination_reserve - destination_amount;
    let root = match round_direction {
        // smaller root -> more shares redeemed
        RoundDirection::Ceiling => integer_sqrt_u256(scaled_supply_squared(
            pool_supply,
            remaining_reserve,
            swap_destination_reserve,
            RoundDirection::Floor,
        )?),
        RoundDirection::Floor => ceil_sqrt_u256(scaled_supply_squared(
            pool_supply,
            remaining_reserve,
            swap_destination_reserve,
            RoundDirection::Ceiling,
        )?),
    };
    pool_supply
        .checked_sub(to_u128(root)?)
        .ok_or(SwapError::CalculationOverflow)
}

/// `isqrt(a * b)`, the invariant normalized to one token dimension
pub fn normalized_value(swap_token_a_amount: u128, swap_token_b_amount: u128) -> Result<u128> {
    match swap_token_a_amount.checked_mul(swap_token_b_amount) {
        Some(product) => Ok(integer_sqrt(product)),
        None => {
            let product = U256::from(swap_token_a_amount)
                .checked_mul(U256::from(swap_token_b_amount))
                .ok_or(SwapError::CalculationOverflow)?;
            to_u128(integer_sqrt_u256(product))
        }
    }
}

impl CurveCalculator for ConstantProductCurve {
    fn swap_without_fees(
        &self,
        source_amount: u128,
        swap_source_amount: u128,
        swap_destination_amount: u128,
        _trade_direction: TradeDirection,
    ) -> Result<SwapWithoutFeesResult> {
        swap(source_amount, swap_source_amount, swap_destination_amount)
    }

    /// Geometric mean of the initial deposits
    fn new_pool_supply(&self, token_a_amount: u64, token_b_amount: u64) -> Result<u128> {
        Ok(integer_sqrt(token_a_amount as u128 * token_b_amount as u128))
    }

    fn pool_tokens_to_trading_tokens(
        &self,
        pool_tokens: u128,
        pool_token_supply: u128,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
        round_direction: RoundDirection,
    ) -> Result<TradingTokenResult> {
        pool_tokens_to_trading_tokens(
            pool_tokens,
            pool_token_supply,
            swap_token_a_amount,
            swap_token_b_amount,
            round_direction,
        )
    }

    fn deposit_single_token_type(
        &self,
        source_amount: u128,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
        pool_supply: u128,
        trade_direction: TradeDirection,
    ) -> Result<u128> {
        deposit_single_token_type(
            source_amount,
            swap_token_a_amount,
            swap_token_b_amount,
            pool_supply,
            trade_direction,
        )
    }

    fn withdraw_single_token_type_exact_out(
        &self,
        destination_amount: u128,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
        pool_supply: u128,
        trade_direction: TradeDirection,
        round_direction: RoundDirection,
    ) -> Result<u128> {
        withdraw_single_token_type_exact_out(
            destination_amount,
            swap_token_a_amount,
            swap_token_b_amount,
            pool_supply,
            trade_direction,
            round_direction,
        )
    }

    fn normalized_value(
        &self,
        swap_token_a_amount: u128,
        swap_token_b_amount: u128,
    ) -> Result<u128> {
        normalized_value(swap_token_a_amount, swap_token_b_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_output_floors() {
        // 1_000_000 * 99_700 / 1_099_700 = 90_661.08...
        let result = swap(99_700, 1_000_000, 1_000_000).unwrap();
        assert_eq!(result.destination_amount_swapped, 90_661);
        assert_eq!(result.source_amount_swapped, 99_700);
    }

    #[test]
    fn test_swap_rejects_zero_output() {
        assert_eq!(swap(1, 1_000_000, 10), Err(SwapError::ZeroTradingTokens));
        assert_eq!(swap(0, 1_000, 1_000), Err(SwapError::ZeroTradingTokens));
    }

    #[test]
    fn test_swap_handles_wide_reserves() {
        let reserve = u64::MAX as u128;
        let result = swap(reserve, reserve, reserve).unwrap();
        assert_eq!(result.destination_amount_swapped, reserve / 2);
    }

    #[test]
    fn test_new_pool_supply_is_geometric_mean() {
        let curve = ConstantProductCurve;
        assert_eq!(curve.new_pool_supply(1_000_000, 1_000_000).unwrap(), 1_000_000);
        assert_eq!(curve.new_pool_supply(100, 400).unwrap(), 200);
        assert_eq!(curve.new_pool_supply(2, 3).unwrap(), 2);
    }

    #[test]
    fn test_proportional_rounding_asymmetry() {
        let deposit =
            pool_tokens_to_trading_tokens(1, 3, 10, 20, RoundDirection::Ceiling).unwrap();
        let withdraw =
            pool_tokens_to_trading_tokens(1, 3, 10, 20, RoundDirection::Floor).unwrap();
        assert_eq!((deposit.token_a_amount, deposit.token_b_amount), (4, 7));
        assert_eq!((withdraw.token_a_amount, withdraw.token_b_amount), (3, 6));
    }

    #[test]
    fn test_proportional_zero_supply() {
        assert_eq!(
            pool_tokens_to_trading_tokens(1, 0, 10, 20, RoundDirection::Floor),
            Err(SwapError::DivisionByZero)
        );
    }

    #[test]
    fn test_deposit_single_matches_closed_form() {
        // doubling the source reserve: supply * (sqrt(2) - 1)
        let shares = deposit_single_token_type(
            1_000_000,
            1_000_000,
            5_000_000,
            1_000_000_000,
            TradeDirection::AtoB,
        )
        .unwrap();
        assert_eq!(shares, 414_213_562);

        // quadrupling the source reserve doubles the supply exactly
        let shares = deposit_single_token_type(
            3_000_000,
            5_000_000,
            1_000_000,
            1_000,
            TradeDirection::BtoA,
        )
        .unwrap();
        assert_eq!(shares, 1_000);
    }

    #[test]
    fn test_withdraw_single_rounding() {
        let ceiling = withdraw_single_token_type_exact_out(
            40,
            1_100_000,
            909_339,
            1_000_000,
            TradeDirection::AtoB,
            RoundDirection::Ceiling,
        )
        .unwrap();
        let floor = withdraw_single_token_type_exact_out(
            40,
            1_100_000,
            909_339,
            1_000_000,
            TradeDirection::AtoB,
            RoundDirection::Floor,
        )
        .unwrap();
        // exact value is 18.18...
        assert_eq!(floor, 18);
        assert_eq!(ceiling, 19);
    }

    #[test]
    fn test_withdraw_single_full_reserve_rejected() {
        assert_eq!(
            withdraw_single_token_type_exact_out(
                1_000,
                1_000,
                1_000,
                1_000,
                TradeDirection::AtoB,
                RoundDirection::Ceiling,
            ),
            Err(SwapError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_withdraw_three_quarters_halves_supply() {
        // sqrt(1 - 3/4) = 1/2
        let shares = withdraw_single_token_type_exact_out(
            750,
            1_000,
            4_000,
            2_000,
            TradeDirection::AtoB,
            RoundDirection::Ceiling,
        )
        .unwrap();
        assert_eq!(shares, 1_000);
    }

    #[test]
    fn test_normalized_value() {
        assert_eq!(normalized_value(1_000_000, 1_000_000).unwrap(), 1_000_000);
        let wide = u64::MAX as u128 * 4;
        assert_eq!(normalized_value(wide, wide).unwrap(), wide);
    }
}
