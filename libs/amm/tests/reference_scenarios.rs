//! End-to-end pool scenarios driven through an in-memory ledger
//!
//! Each scenario commits operations with `PoolState::execute` and replays the
//! returned effects against balances, then checks the ledger agrees with the
//! pool snapshot.

use amm::{
    AccountRef, Asset, CurveKind, DepositAllRequest, DepositSingleRequest, Fees,
    InitializeRequest, Ledger, Operation, Party, PoolState, PoolStatus, SwapError, SwapRequest,
    TokenSide, TradeDirection, WithdrawAllRequest, WithdrawSingleRequest,
};
use std::collections::HashMap;

const FEE_COLLECTOR: AccountRef = AccountRef([0x11; 32]);
const HOST: AccountRef = AccountRef([0x22; 32]);

fn reference_fees() -> Fees {
    Fees {
        trade_fee_numerator: 25,
        trade_fee_denominator: 10_000,
        owner_trade_fee_numerator: 5,
        owner_trade_fee_denominator: 10_000,
        owner_withdraw_fee_numerator: 1,
        owner_withdraw_fee_denominator: 6,
        host_fee_numerator: 20,
        host_fee_denominator: 100,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LedgerError {
    Insufficient { asset: Asset, holder: Party },
}

/// Balances keyed by (asset, holder); the user starts with ample trading tokens
#[derive(Default)]
struct MemoryLedger {
    balances: HashMap<(Asset, Party), u64>,
    share_supply: u64,
}

impl MemoryLedger {
    fn funded_user(amount: u64) -> Self {
        let mut ledger = Self::default();
        ledger.balances.insert((Asset::TokenA, Party::User), amount);
        ledger.balances.insert((Asset::TokenB, Party::User), amount);
        ledger
    }

    fn balance(&self, asset: Asset, holder: Party) -> u64 {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    fn debit(&mut self, asset: Asset, holder: Party, amount: u64) -> Result<(), LedgerError> {
        let balance = self.balances.entry((asset, holder)).or_insert(0);
        *balance = balance
            .checked_sub(amount)
            .ok_or(LedgerError::Insufficient { asset, holder })?;
        Ok(())
    }

    fn credit(&mut self, asset: Asset, holder: Party, amount: u64) {
        *self.balances.entry((asset, holder)).or_insert(0) += amount;
    }

    fn assert_matches(&self, pool: &PoolState) {
        assert_eq!(self.balance(Asset::TokenA, Party::Reserve), pool.reserve_a);
        assert_eq!(self.balance(Asset::TokenB, Party::Reserve), pool.reserve_b);
        assert_eq!(self.share_supply, pool.share_supply);
        let held: u64 = self
            .balances
            .iter()
            .filter(|((asset, _), _)| *asset == Asset::PoolShare)
            .map(|(_, amount)| *amount)
            .sum();
        assert_eq!(held, pool.share_supply);
    }
}

impl Ledger for MemoryLedger {
    type Error = LedgerError;

    fn transfer(
        &mut self,
        asset: Asset,
        from: Party,
        to: Party,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount);
        Ok(())
    }

    fn mint(&mut self, to: Party, amount: u64) -> Result<(), LedgerError> {
        self.credit(Asset::PoolShare, to, amount);
        self.share_supply += amount;
        Ok(())
    }

    fn burn(&mut self, from: Party, amount: u64) -> Result<(), LedgerError> {
        self.debit(Asset::PoolShare, from, amount)?;
        self.share_supply -= amount;
        Ok(())
    }
}

fn run(
    pool: &mut PoolState,
    ledger: &mut MemoryLedger,
    operation: Operation,
) -> Result<(), SwapError> {
    let effect = pool.execute(operation)?;
    effect.apply(ledger).unwrap();
    ledger.assert_matches(pool);
    Ok(())
}

fn reference_pool(ledger: &mut MemoryLedger) -> PoolState {
    let mut pool = PoolState::new(reference_fees(), CurveKind::ConstantProduct, FEE_COLLECTOR)
        .with_host_fee_collector(HOST);
    run(
        &mut pool,
        ledger,
        Operation::Initialize(InitializeRequest {
            token_a_amount: 1_000_000,
            token_b_amount: 1_000_000,
        }),
    )
    .unwrap();
    pool
}

#[test]
fn test_initialize_supply_is_geometric_mean() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let pool = reference_pool(&mut ledger);
    assert_eq!(pool.share_supply, 1_000_000);
    assert_eq!(ledger.balance(Asset::PoolShare, Party::User), 1_000_000);
}

#[test]
fn test_reference_swap() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let mut pool = reference_pool(&mut ledger);

    run(
        &mut pool,
        &mut ledger,
        Operation::Swap(SwapRequest {
            direction: TradeDirection::AtoB,
            amount_in: 100_000,
            minimum_amount_out: 0,
        }),
    )
    .unwrap();

    assert_eq!(ledger.balance(Asset::TokenB, Party::User), 10_000_000 - 1_000_000 + 90_661);
    assert_eq!(pool.reserve_a, 1_100_000);
    assert_eq!(pool.reserve_b, 909_339);
    assert_eq!(
        ledger.balance(Asset::PoolShare, Party::FeeCollector(FEE_COLLECTOR)),
        18
    );
    assert_eq!(ledger.balance(Asset::PoolShare, Party::HostFeeCollector(HOST)), 4);
    assert_eq!(pool.share_supply, 1_000_022);
}

#[test]
fn test_reference_swap_without_host() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let mut pool = PoolState::new(reference_fees(), CurveKind::ConstantProduct, FEE_COLLECTOR);
    run(
        &mut pool,
        &mut ledger,
        Operation::Initialize(InitializeRequest {
            token_a_amount: 1_000_000,
            token_b_amount: 1_000_000,
        }),
    )
    .unwrap();
    run(
        &mut pool,
        &mut ledger,
        Operation::Swap(SwapRequest {
            direction: TradeDirection::AtoB,
            amount_in: 100_000,
            minimum_amount_out: 90_661,
        }),
    )
    .unwrap();
    assert_eq!(pool.reserve_b, 909_339);
    assert_eq!(
        ledger.balance(Asset::PoolShare, Party::FeeCollector(FEE_COLLECTOR)),
        22
    );
}

#[test]
fn test_reference_deposit_all() {
    let mut pool = PoolState {
        status: PoolStatus::Initialized,
        reserve_a: 1_000_000,
        reserve_b: 1_000_000,
        share_supply: 1_000_000_000,
        fees: reference_fees(),
        curve: CurveKind::ConstantProduct,
        fee_collector: FEE_COLLECTOR,
        host_fee_collector: None,
    };
    let mut ledger = MemoryLedger::funded_user(1_000_000);
    ledger.credit(Asset::TokenA, Party::Reserve, 1_000_000);
    ledger.credit(Asset::TokenB, Party::Reserve, 1_000_000);
    ledger.mint(Party::User, 1_000_000_000).unwrap();
    ledger.assert_matches(&pool);

    let effect = pool
        .execute(Operation::DepositAllTokenTypes(DepositAllRequest {
            pool_token_amount: 10_000_000,
            maximum_token_a_amount: 10_000,
            maximum_token_b_amount: 10_000,
        }))
        .unwrap();
    effect.apply(&mut ledger).unwrap();
    ledger.assert_matches(&pool);

    assert_eq!(pool.share_supply, 1_010_000_000);
    assert_eq!(effect.reserve_a_delta, 10_000);
    assert_eq!(effect.reserve_b_delta, 10_000);
    assert_eq!(ledger.balance(Asset::TokenA, Party::User), 990_000);
}

#[test]
fn test_deposit_then_withdraw_round_trip() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let mut pool = reference_pool(&mut ledger);
    run(
        &mut pool,
        &mut ledger,
        Operation::Swap(SwapRequest {
            direction: TradeDirection::BtoA,
            amount_in: 33_333,
            minimum_amount_out: 0,
        }),
    )
    .unwrap();

    let a_before = ledger.balance(Asset::TokenA, Party::User);
    let b_before = ledger.balance(Asset::TokenB, Party::User);
    run(
        &mut pool,
        &mut ledger,
        Operation::DepositAllTokenTypes(DepositAllRequest {
            pool_token_amount: 12_345,
            maximum_token_a_amount: u64::MAX,
            maximum_token_b_amount: u64::MAX,
        }),
    )
    .unwrap();
    // the user doubles as fee collector here so no withdrawal fee applies
    run(
        &mut pool,
        &mut ledger,
        Operation::WithdrawAllTokenTypes(WithdrawAllRequest {
            pool_token_amount: 12_345,
            minimum_token_a_amount: 0,
            minimum_token_b_amount: 0,
            source_is_fee_collector: true,
        }),
    )
    .unwrap();
    assert!(ledger.balance(Asset::TokenA, Party::User) <= a_before);
    assert!(ledger.balance(Asset::TokenB, Party::User) <= b_before);
}

#[test]
fn test_withdraw_all_pays_fee_to_collector() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let mut pool = reference_pool(&mut ledger);
    run(
        &mut pool,
        &mut ledger,
        Operation::WithdrawAllTokenTypes(WithdrawAllRequest {
            pool_token_amount: 60_000,
            minimum_token_a_amount: 50_000,
            minimum_token_b_amount: 50_000,
            source_is_fee_collector: false,
        }),
    )
    .unwrap();
    assert_eq!(
        ledger.balance(Asset::PoolShare, Party::FeeCollector(FEE_COLLECTOR)),
        10_000
    );
    assert_eq!(pool.share_supply, 950_000);
    assert_eq!(pool.reserve_a, 950_000);
}

#[test]
fn test_single_sided_cycle() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let mut pool = reference_pool(&mut ledger);
    let value_before = pool.normalized_value().unwrap() * 1_000_000 / pool.share_supply as u128;

    run(
        &mut pool,
        &mut ledger,
        Operation::DepositSingleTokenTypeExactAmountIn(DepositSingleRequest {
            token: TokenSide::A,
            source_amount: 100_000,
            minimum_pool_token_amount: 1,
        }),
    )
    .unwrap();
    let minted = ledger.balance(Asset::PoolShare, Party::User) - 1_000_000;
    assert!(minted > 0 && minted < 48_809);

    run(
        &mut pool,
        &mut ledger,
        Operation::WithdrawSingleTokenTypeExactAmountOut(WithdrawSingleRequest {
            token: TokenSide::B,
            destination_amount: 50_000,
            maximum_pool_token_amount: 100_000,
            source_is_fee_collector: false,
        }),
    )
    .unwrap();
    assert_eq!(pool.reserve_b, 950_000);

    // value per share never drops for remaining holders
    let value_after = pool.normalized_value().unwrap() * 1_000_000 / pool.share_supply as u128;
    assert!(value_after >= value_before);
}

#[test]
fn test_failed_operation_emits_nothing() {
    let mut ledger = MemoryLedger::funded_user(10_000_000);
    let mut pool = reference_pool(&mut ledger);
    let before = pool.clone();

    let result = pool.execute(Operation::WithdrawSingleTokenTypeExactAmountOut(
        WithdrawSingleRequest {
            token: TokenSide::A,
            destination_amount: 10_000,
            maximum_pool_token_amount: 1,
            source_is_fee_collector: false,
        },
    ));
    assert!(matches!(result, Err(SwapError::ExceededSlippage { .. })));
    assert_eq!(pool, before);
    ledger.assert_matches(&pool);
}
