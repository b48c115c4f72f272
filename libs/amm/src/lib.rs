//! # Token Swap AMM - Constant Product Pool Engine
//!
//! ## Purpose
//!
//! Exact-integer engine for a two-asset liquidity pool: swap pricing, proportional
//! and single-sided liquidity changes, and the fee schedule that splits every trade
//! between liquidity providers, the pool owner and an optional host. Operations are
//! pure functions from a pool snapshot and a request to the next snapshot plus the
//! ledger effects that realize it.
//!
//! ## Integration Points
//!
//! - **Input**: [`PoolState`] snapshots handed in by the storage collaborator, one
//!   request per [`Operation`]
//! - **Output**: [`Transition`] with the next snapshot and a [`PoolEffect`] listing
//!   transfers, mints and burns in the order they must be applied
//! - **Ledger**: callers implement [`Ledger`] and drive it with [`PoolEffect::apply`]
//! - **Precision**: `u64` ledger amounts, `u128`/`U256` intermediates, no floating point
//! - **Validation**: every overflow, zero amount and slippage bound is a typed [`SwapError`]
//!
//! ## Architecture Role
//!
//! ```text
//! math ──> fees ──> curve (CurveCalculator + SwapCurve) ──> operations ──> effects
//!                                     ^                          |
//!                                     └──── PoolState <──────────┘
//! ```
//!
//! Rounding always favours the pool: deposits round up, withdrawals and swap
//! outputs round down, fees round up except the host split.
//!
//! ## Usage
//!
//! ```rust
//! use amm::{
//!     AccountRef, CurveKind, Fees, InitializeRequest, Operation, PoolState, SwapRequest,
//!     TradeDirection,
//! };
//!
//! let fees = Fees {
//!     trade_fee_numerator: 25,
//!     trade_fee_denominator: 10_000,
//!     owner_trade_fee_numerator: 5,
//!     owner_trade_fee_denominator: 10_000,
//!     owner_withdraw_fee_numerator: 1,
//!     owner_withdraw_fee_denominator: 6,
//!     host_fee_numerator: 20,
//!     host_fee_denominator: 100,
//! };
//! let mut pool = PoolState::new(fees, CurveKind::ConstantProduct, AccountRef([1; 32]));
//! pool.execute(Operation::Initialize(InitializeRequest {
//!     token_a_amount: 1_000_000,
//!     token_b_amount: 1_000_000,
//! }))?;
//! pool.execute(Operation::Swap(SwapRequest {
//!     direction: TradeDirection::AtoB,
//!     amount_in: 100_000,
//!     minimum_amount_out: 0,
//! }))?;
//! assert_eq!(pool.reserve_b, 909_339);
//! # Ok::<(), amm::SwapError>(())
//! ```

pub mod constraints;
pub mod curve;
pub mod error;
pub mod fees;
pub mod ledger;
pub mod math;
pub mod operations;
pub mod pool;

pub use constraints::SwapConstraints;
pub use curve::{
    ConstantProductCurve, CurveCalculator, CurveKind, RoundDirection, SwapCurve, SwapOutcome,
    TradeDirection,
};
pub use error::{Result, SwapError};
pub use fees::{FeeBreakdown, Fees};
pub use ledger::{Asset, FeeShares, Ledger, LedgerEffect, Party, PoolEffect};
pub use operations::{
    deposit_all_token_types, deposit_single_token_type_exact_amount_in, initialize,
    initialize_with_constraints, process, swap, withdraw_all_token_types,
    withdraw_single_token_type_exact_amount_out, DepositAllRequest, DepositSingleRequest,
    InitializeRequest, Operation, SwapRequest, Transition, WithdrawAllRequest,
    WithdrawSingleRequest,
};
pub use pool::{AccountRef, PoolState, PoolStatus, TokenSide};
