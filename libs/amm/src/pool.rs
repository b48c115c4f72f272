//! Pool state for one token pair

use crate::curve::{CurveKind, SwapCurve, TradeDirection};
use crate::error::{Result, SwapError};
use crate::fees::Fees;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 32-byte account reference (fee collectors, deployment owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccountRef(pub [u8; 32]);

impl AccountRef {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex string, `0x` prefix optional
    pub fn from_hex(s: &str) -> std::result::Result<Self, String> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| format!("Invalid hex: {}", e))?;
        if bytes.len() != 32 {
            return Err(format!(
                "Invalid account length: expected 32 bytes, got {}",
                bytes.len()
            ));
        }
        let mut account = [0u8; 32];
        account.copy_from_slice(&bytes);
        Ok(Self(account))
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Lifecycle of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolStatus {
    /// Created but never funded
    #[default]
    Uninitialized,
    /// Funded; shares outstanding
    Initialized,
}

/// Which reserve a single-sided operation touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSide {
    A,
    B,
}

impl TokenSide {
    /// Direction whose source side is this token
    #[inline]
    pub fn as_source(self) -> TradeDirection {
        match self {
            TokenSide::A => TradeDirection::AtoB,
            TokenSide::B => TradeDirection::BtoA,
        }
    }
}

/// Reserves, share supply, fee schedule and curve of one pool
///
/// Plain data: operations read a snapshot and return the next one, so the
/// caller decides when (and whether) to store it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub status: PoolStatus,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub share_supply: u64,
    pub fees: Fees,
    pub curve: CurveKind,
    /// Receives owner trade fees and withdrawal fees as pool shares
    pub fee_collector: AccountRef,
    /// Receives the host portion of owner trade fees when present
    #[serde(default)]
    pub host_fee_collector: Option<AccountRef>,
}

impl PoolState {
    /// Unfunded pool carrying its fee schedule and collectors
    pub fn new(fees: Fees, curve: CurveKind, fee_collector: AccountRef) -> Self {
        Self {
            status: PoolStatus::Uninitialized,
            reserve_a: 0,
            reserve_b: 0,
            share_supply: 0,
            fees,
            curve,
            fee_collector,
            host_fee_collector: None,
        }
    }

    pub fn with_host_fee_collector(mut self, host: AccountRef) -> Self {
        self.host_fee_collector = Some(host);
        self
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.status == PoolStatus::Initialized
    }

    /// Fee-aware curve for this pool
    pub fn swap_curve(&self) -> SwapCurve {
        SwapCurve::new(self.curve)
    }

    /// Reserve of one side
    #[inline]
    pub fn reserve(&self, side: TokenSide) -> u64 {
        match side {
            TokenSide::A => self.reserve_a,
            TokenSide::B => self.reserve_b,
        }
    }

    /// `(source_reserve, destination_reserve)` for a trade direction
    #[inline]
    pub fn reserves_for(&self, direction: TradeDirection) -> (u64, u64) {
        match direction {
            TradeDirection::AtoB => (self.reserve_a, self.reserve_b),
            TradeDirection::BtoA => (self.reserve_b, self.reserve_a),
        }
    }

    /// Store `(source_reserve, destination_reserve)` back by direction
    #[inline]
    pub(crate) fn set_reserves_for(
        &mut self,
        direction: TradeDirection,
        source: u64,
        destination: u64,
    ) {
        match direction {
            TradeDirection::AtoB => {
                self.reserve_a = source;
                self.reserve_b = destination;
            }
            TradeDirection::BtoA => {
                self.reserve_b = source;
                self.reserve_a = destination;
            }
        }
    }

    /// Funded pool whose stored fee schedule is still valid
    pub(crate) fn require_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(SwapError::NotInitialized);
        }
        self.fees.validate()
    }

    /// Curve invariant normalized to one token dimension
    pub fn normalized_value(&self) -> Result<u128> {
        self.curve
            .calculator()
            .normalized_value(self.reserve_a as u128, self.reserve_b as u128)
    }

    /// Check the structural invariants of an initialized pool
    pub fn check_invariants(&self) -> Result<()> {
        self.fees.validate()?;
        match self.status {
            PoolStatus::Uninitialized => {
                if self.share_supply != 0 {
                    return Err(SwapError::AlreadyInitialized);
                }
            }
            PoolStatus::Initialized => {
                if self.share_supply == 0 {
                    return Err(SwapError::NotInitialized);
                }
                if self.reserve_a == 0 || self.reserve_b == 0 {
                    return Err(SwapError::InsufficientLiquidity);
                }
            }
        }
        Ok(())
    }
}
