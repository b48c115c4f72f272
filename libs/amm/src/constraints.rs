//! Deployment-wide rules checked when a pool is initialized

use crate::curve::CurveKind;
use crate::error::{Result, SwapError};
use crate::fees::Fees;
use crate::pool::{AccountRef, PoolState};
use serde::{Deserialize, Serialize};

/// Restrictions a deployment places on newly initialized pools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapConstraints {
    /// Required fee collector, if any
    pub owner_key: Option<AccountRef>,
    pub valid_curve_types: Vec<CurveKind>,
    /// Floor for each fee numerator; denominators and the host fee must match
    pub minimum_fees: Fees,
}

impl SwapConstraints {
    pub fn validate_curve(&self, curve: CurveKind) -> Result<()> {
        if !self.valid_curve_types.contains(&curve) {
            return Err(SwapError::UnsupportedCurveType);
        }
        Ok(())
    }

    pub fn validate_fees(&self, fees: &Fees) -> Result<()> {
        let min = &self.minimum_fees;
        let at_least = |fee: &'static str, num: u64, den: u64, min_num: u64, min_den: u64| {
            if num >= min_num && den == min_den {
                Ok(())
            } else {
                Err(SwapError::InvalidFeeConfiguration {
                    fee,
                    numerator: num,
                    denominator: den,
                })
            }
        };
        at_least(
            "trade",
            fees.trade_fee_numerator,
            fees.trade_fee_denominator,
            min.trade_fee_numerator,
            min.trade_fee_denominator,
        )?;
        at_least(
            "owner trade",
            fees.owner_trade_fee_numerator,
            fees.owner_trade_fee_denominator,
            min.owner_trade_fee_numerator,
            min.owner_trade_fee_denominator,
        )?;
        at_least(
            "owner withdraw",
            fees.owner_withdraw_fee_numerator,
            fees.owner_withdraw_fee_denominator,
            min.owner_withdraw_fee_numerator,
            min.owner_withdraw_fee_denominator,
        )?;
        // host split is fixed per deployment
        if fees.host_fee_numerator != min.host_fee_numerator
            || fees.host_fee_denominator != min.host_fee_denominator
        {
            return Err(SwapError::InvalidFeeConfiguration {
                fee: "host",
                numerator: fees.host_fee_numerator,
                denominator: fees.host_fee_denominator,
            });
        }
        Ok(())
    }

    /// Check a pool's collector, curve and fees against these constraints
    pub fn validate(&self, pool: &PoolState) -> Result<()> {
        if let Some(owner) = self.owner_key {
            if owner != pool.fee_collector {
                return Err(SwapError::InvalidFeeCollector);
            }
        }
        self.validate_curve(pool.curve)?;
        self.validate_fees(&pool.fees)
    }
}
