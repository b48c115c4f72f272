//! Ledger effects produced by pool operations
//!
//! Operations never move tokens. They describe the transfers, mints and burns
//! a collaborator must perform, in order, through the [`Ledger`] trait.

use crate::pool::AccountRef;
use serde::{Deserialize, Serialize};

/// Asset moved by a ledger effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    TokenA,
    TokenB,
    PoolShare,
}

/// Holder of an asset from the pool's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    /// The account that submitted the request
    User,
    /// The pool's own token reserves
    Reserve,
    FeeCollector(AccountRef),
    HostFeeCollector(AccountRef),
}

/// One instruction for the token ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEffect {
    Transfer {
        asset: Asset,
        from: Party,
        to: Party,
        amount: u64,
    },
    /// New pool shares
    Mint { to: Party, amount: u64 },
    /// Pool shares destroyed
    Burn { from: Party, amount: u64 },
}

/// Pool shares credited to fee collectors by one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeShares {
    pub owner: u64,
    pub host: u64,
}

/// Net change produced by a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolEffect {
    pub reserve_a_delta: i128,
    pub reserve_b_delta: i128,
    pub share_supply_delta: i128,
    pub fee_shares: FeeShares,
    pub ledger: Vec<LedgerEffect>,
}

impl PoolEffect {
    pub(crate) fn transfer(&mut self, asset: Asset, from: Party, to: Party, amount: u64) {
        if amount > 0 {
            self.ledger.push(LedgerEffect::Transfer {
                asset,
                from,
                to,
                amount,
            });
        }
    }

    pub(crate) fn mint(&mut self, to: Party, amount: u64) {
        if amount > 0 {
            self.ledger.push(LedgerEffect::Mint { to, amount });
        }
    }

    pub(crate) fn burn(&mut self, from: Party, amount: u64) {
        if amount > 0 {
            self.ledger.push(LedgerEffect::Burn { from, amount });
        }
    }

    /// Drive a ledger through every instruction, stopping at the first error
    pub fn apply<L: Ledger>(&self, ledger: &mut L) -> Result<(), L::Error> {
        for effect in &self.ledger {
            match *effect {
                LedgerEffect::Transfer {
                    asset,
                    from,
                    to,
                    amount,
                } => ledger.transfer(asset, from, to, amount)?,
                LedgerEffect::Mint { to, amount } => ledger.mint(to, amount)?,
                LedgerEffect::Burn { from, amount } => ledger.burn(from, amount)?,
            }
        }
        Ok(())
    }
}

/// Token ledger collaborator
///
/// Implementations own balances and authorization. The pool engine only
/// hands them the instructions of a committed transition.
pub trait Ledger {
    type Error;

    fn transfer(&mut self, asset: Asset, from: Party, to: Party, amount: u64)
        -> Result<(), Self::Error>;

    fn mint(&mut self, to: Party, amount: u64) -> Result<(), Self::Error>;

    fn burn(&mut self, from: Party, amount: u64) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<LedgerEffect>,
        fail_on_burn: bool,
    }

    impl Ledger for Recorder {
        type Error = &'static str;

        fn transfer(
            &mut self,
            asset: Asset,
            from: Party,
            to: Party,
            amount: u64,
        ) -> Result<(), Self::Error> {
            self.calls.push(LedgerEffect::Transfer {
                asset,
                from,
                to,
                amount,
            });
            Ok(())
        }

        fn mint(&mut self, to: Party, amount: u64) -> Result<(), Self::Error> {
            self.calls.push(LedgerEffect::Mint { to, amount });
            Ok(())
        }

        fn burn(&mut self, from: Party, amount: u64) -> Result<(), Self::Error> {
            if self.fail_on_burn {
                return Err("burn refused");
            }
            self.calls.push(LedgerEffect::Burn { from, amount });
            Ok(())
        }
    }

    #[test]
    fn test_zero_amounts_are_skipped() {
        let mut effect = PoolEffect::default();
        effect.transfer(Asset::TokenA, Party::User, Party::Reserve, 0);
        effect.mint(Party::User, 0);
        effect.burn(Party::User, 0);
        assert!(effect.ledger.is_empty());
    }

    #[test]
    fn test_apply_preserves_order() {
        let mut effect = PoolEffect::default();
        effect.transfer(Asset::TokenA, Party::User, Party::Reserve, 5);
        effect.mint(Party::User, 7);
        let mut ledger = Recorder::default();
        effect.apply(&mut ledger).unwrap();
        assert_eq!(ledger.calls, effect.ledger);
    }

    #[test]
    fn test_apply_stops_on_error() {
        let mut effect = PoolEffect::default();
        effect.burn(Party::User, 3);
        effect.mint(Party::User, 1);
        let mut ledger = Recorder {
            fail_on_burn: true,
            ..Default::default()
        };
        assert_eq!(effect.apply(&mut ledger), Err("burn refused"));
        assert!(ledger.calls.is_empty());
    }
}
