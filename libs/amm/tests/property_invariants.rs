//! Pool Invariant Property Tests
//!
//! These tests validate properties that must hold for every valid input,
//! independent of specific reserves or fee schedules.

use amm::{
    AccountRef, CurveKind, DepositAllRequest, DepositSingleRequest, Fees, InitializeRequest,
    Operation, PoolState, SwapCurve, SwapError, SwapRequest, TokenSide, TradeDirection,
    WithdrawAllRequest, WithdrawSingleRequest,
};
use primitive_types::U256;
use proptest::prelude::*;

const COLLECTOR: AccountRef = AccountRef([9; 32]);

prop_compose! {
    fn fee_rate()(denominator in 1u64..=10_000u64)
        (numerator in 0..=denominator / 10, denominator in Just(denominator)) -> (u64, u64) {
        (numerator, denominator)
    }
}

prop_compose! {
    fn fee_schedule()
        (
            trade in fee_rate(),
            owner in fee_rate(),
            withdraw in fee_rate(),
            host in (1u64..=100u64).prop_flat_map(|den| (0..=den, Just(den))),
        ) -> Fees {
        Fees {
            trade_fee_numerator: trade.0,
            trade_fee_denominator: trade.1,
            owner_trade_fee_numerator: owner.0,
            owner_trade_fee_denominator: owner.1,
            owner_withdraw_fee_numerator: withdraw.0,
            owner_withdraw_fee_denominator: withdraw.1,
            host_fee_numerator: host.0,
            host_fee_denominator: host.1,
        }
    }
}

prop_compose! {
    fn valid_reserve()(reserve in 1_000u64..1_000_000_000_000u64) -> u64 {
        reserve
    }
}

prop_compose! {
    fn funded_pool()
        (fees in fee_schedule(), a in valid_reserve(), b in valid_reserve(), host in any::<bool>())
        -> PoolState {
        let mut pool = PoolState::new(fees, CurveKind::ConstantProduct, COLLECTOR);
        if host {
            pool = pool.with_host_fee_collector(AccountRef([3; 32]));
        }
        pool.execute(Operation::Initialize(InitializeRequest {
            token_a_amount: a,
            token_b_amount: b,
        }))
        .unwrap();
        pool
    }
}

fn direction() -> impl Strategy<Value = TradeDirection> {
    prop_oneof![Just(TradeDirection::AtoB), Just(TradeDirection::BtoA)]
}

fn side() -> impl Strategy<Value = TokenSide> {
    prop_oneof![Just(TokenSide::A), Just(TokenSide::B)]
}

fn product(pool: &PoolState) -> u128 {
    pool.reserve_a as u128 * pool.reserve_b as u128
}

/// `value_after^2 / supply_after^2 >= value_before^2 / supply_before^2` with
/// value^2 taken as the exact reserve product
fn value_per_share_kept(before: &PoolState, after: &PoolState) -> bool {
    let supply_before = U256::from(before.share_supply);
    let supply_after = U256::from(after.share_supply);
    let lhs = U256::from(product(after)) * supply_before * supply_before;
    let rhs = U256::from(product(before)) * supply_after * supply_after;
    lhs >= rhs
}

proptest! {
    #[test]
    fn prop_fee_conservation(
        fees in fee_schedule(),
        amount in 1u64..u64::MAX / 2,
        host in any::<bool>(),
    ) {
        match fees.apply(amount, host) {
            Ok(breakdown) => {
                prop_assert_eq!(
                    breakdown.trade_fee + breakdown.owner_fee + breakdown.net_amount,
                    amount
                );
                prop_assert!(breakdown.host_fee <= breakdown.owner_fee);
            }
            Err(SwapError::FeeExceedsAmount { fees, amount: gross }) => {
                prop_assert!(fees > gross);
            }
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[test]
    fn prop_swap_never_shrinks_invariant(
        pool in funded_pool(),
        direction in direction(),
        amount_in in 1u64..10_000_000_000u64,
    ) {
        let before = product(&pool);
        let request = SwapRequest { direction, amount_in, minimum_amount_out: 0 };
        if let Ok(transition) = amm::swap(&pool, &request) {
            prop_assert!(product(&transition.pool) >= before);
            if pool.fees.trade_fee_numerator > 0 {
                prop_assert!(product(&transition.pool) > before);
            }
            prop_assert!(transition.pool.reserve_a > 0 && transition.pool.reserve_b > 0);
            prop_assert!(transition.pool.share_supply >= pool.share_supply);
        }
    }

    #[test]
    fn prop_swap_output_monotonic(
        source in valid_reserve(),
        destination in valid_reserve(),
        amount in 1_000u64..1_000_000_000u64,
        extra in 10u64..1_000_000u64,
        fees in fee_schedule(),
    ) {
        let curve = SwapCurve::default();
        let small = curve
            .swap(amount, source, destination, TradeDirection::AtoB, &fees, false)
            .ok();
        let large = curve
            .swap(amount + extra, source, destination, TradeDirection::AtoB, &fees, false)
            .ok();
        let deeper = curve
            .swap(amount, source + extra, destination, TradeDirection::AtoB, &fees, false)
            .ok();
        if let (Some(small), Some(large)) = (small, large) {
            prop_assert!(large.amount_out >= small.amount_out);
        }
        if let (Some(small), Some(deeper)) = (small, deeper) {
            prop_assert!(deeper.amount_out <= small.amount_out);
        }
    }

    #[test]
    fn prop_proportional_round_trip_never_profits(
        pool in funded_pool(),
        shares in 1u64..1_000_000u64,
    ) {
        let deposit = DepositAllRequest {
            pool_token_amount: shares,
            maximum_token_a_amount: u64::MAX,
            maximum_token_b_amount: u64::MAX,
        };
        let Ok(deposited) = amm::deposit_all_token_types(&pool, &deposit) else {
            return Ok(());
        };
        let withdraw = WithdrawAllRequest {
            pool_token_amount: shares,
            minimum_token_a_amount: 0,
            minimum_token_b_amount: 0,
            source_is_fee_collector: true,
        };
        if let Ok(withdrawn) = amm::withdraw_all_token_types(&deposited.pool, &withdraw) {
            prop_assert!(-withdrawn.effect.reserve_a_delta <= deposited.effect.reserve_a_delta);
            prop_assert!(-withdrawn.effect.reserve_b_delta <= deposited.effect.reserve_b_delta);
            prop_assert_eq!(withdrawn.pool.share_supply, pool.share_supply);
            prop_assert!(withdrawn.pool.reserve_a >= pool.reserve_a);
            prop_assert!(withdrawn.pool.reserve_b >= pool.reserve_b);
        }
    }

    #[test]
    fn prop_single_deposit_keeps_share_value(
        pool in funded_pool(),
        token in side(),
        amount in 1u64..10_000_000_000u64,
    ) {
        let request = DepositSingleRequest {
            token,
            source_amount: amount,
            minimum_pool_token_amount: 0,
        };
        if let Ok(transition) = amm::deposit_single_token_type_exact_amount_in(&pool, &request) {
            prop_assert!(value_per_share_kept(&pool, &transition.pool));
        }
    }

    #[test]
    fn prop_single_withdraw_keeps_share_value(
        pool in funded_pool(),
        token in side(),
        fraction in 1u64..900u64,
    ) {
        let destination_amount = pool.reserve(token) / 1_000 * fraction;
        let request = WithdrawSingleRequest {
            token,
            destination_amount,
            maximum_pool_token_amount: u64::MAX,
            source_is_fee_collector: false,
        };
        if let Ok(transition) = amm::withdraw_single_token_type_exact_amount_out(&pool, &request) {
            prop_assert!(value_per_share_kept(&pool, &transition.pool));
            prop_assert_eq!(
                transition.pool.reserve(token),
                pool.reserve(token) - destination_amount
            );
        }
    }

    #[test]
    fn prop_failed_execute_leaves_pool_unchanged(
        pool in funded_pool(),
        direction in direction(),
        amount_in in 1u64..1_000_000u64,
    ) {
        let mut pool = pool;
        let before = pool.clone();
        let result = pool.execute(Operation::Swap(SwapRequest {
            direction,
            amount_in,
            minimum_amount_out: u64::MAX,
        }));
        prop_assert!(result.is_err());
        prop_assert_eq!(pool, before);
    }
}
