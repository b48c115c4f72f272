//! Error taxonomy for the pool engine
//!
//! Every failure is terminal for the attempted operation. Curve and fee errors
//! propagate unchanged through the operation layer, and a failed operation
//! never produces a partial state or any ledger effect.

use thiserror::Error;

/// Errors returned by curve math, fee computation and pool operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// A fee rate has a zero denominator or a numerator above its denominator,
    /// or violates the deployment's minimum fee constraints
    #[error("Invalid {fee} fee configuration: {numerator}/{denominator}")]
    InvalidFeeConfiguration {
        fee: &'static str,
        numerator: u64,
        denominator: u64,
    },

    /// Initialize called on a pool that already has shares outstanding
    #[error("Pool is already initialized")]
    AlreadyInitialized,

    /// Operation requires an initialized pool
    #[error("Pool is not initialized")]
    NotInitialized,

    /// An amount that must be positive resolved to zero
    #[error("Operation resolves to zero trading tokens")]
    ZeroTradingTokens,

    /// An arithmetic step exceeded the representable range
    #[error("Calculation overflow")]
    CalculationOverflow,

    /// A ratio computation had a zero divisor
    #[error("Division by zero")]
    DivisionByZero,

    /// Computed amount violates the caller's minimum or maximum bound
    #[error("Exceeded slippage: computed {computed}, limit {limit}")]
    ExceededSlippage { computed: u64, limit: u64 },

    /// Requested withdrawal exceeds available reserves or share supply
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    /// Trade and owner fees together exceed the gross amount
    #[error("Fees {fees} exceed amount {amount}")]
    FeeExceedsAmount { fees: u64, amount: u64 },

    /// Curve type is not allowed by the deployment constraints
    #[error("Curve type is not supported by the deployment constraints")]
    UnsupportedCurveType,

    /// The operation cannot be performed on the pool's curve
    #[error("Operation is not supported by the pool curve")]
    UnsupportedCurveOperation,

    /// Fee collector does not match the deployment owner
    #[error("Fee collector does not match the required owner")]
    InvalidFeeCollector,
}

pub type Result<T> = std::result::Result<T, SwapError>;
