//! Bond account types
//!
//! A bond is collateral an agent deposits to back claims against it. Part
//! of the bond can be earmarked ("locked") against pending claims without
//! leaving the account; slashing removes locked value for good.

use crate::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-agent collateral account.
///
/// Created implicitly on first deposit and never destroyed; a zero
/// balance is a valid terminal state. `available` is always derived as
/// `total_bond - locked`, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondAccount {
    /// Total collateral currently in the account
    pub total_bond: Amount,
    /// Portion earmarked against pending claims
    pub locked: Amount,
    /// Set on first deposit only
    pub bonded_since: Option<DateTime<Utc>>,
}

impl BondAccount {
    /// Unlocked portion of the bond
    pub fn available(&self) -> Amount {
        // locked <= total_bond is a ledger invariant
        Amount::new(self.total_bond.value().saturating_sub(self.locked.value()))
    }

    pub fn is_bonded(&self) -> bool {
        !self.total_bond.is_zero()
    }
}

/// Snapshot of a bond account returned by status reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondStatus {
    pub total_bond: Amount,
    pub locked: Amount,
    pub available: Amount,
    pub bonded_since: Option<DateTime<Utc>>,
    pub is_bonded: bool,
}

/// Aggregate bond-side protocol statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondProtocolStats {
    /// Cumulative deposits across all agents
    pub total_deposited: Amount,
    /// Cumulative slashed value
    pub total_slashed: Amount,
    /// Number of agents with a non-zero bond
    pub active_agents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_is_derived() {
        let account = BondAccount {
            total_bond: Amount::from_units(100),
            locked: Amount::from_units(30),
            bonded_since: Some(Utc::now()),
        };
        assert_eq!(account.available(), Amount::from_units(70));
        assert!(account.is_bonded());
    }

    #[test]
    fn test_zero_balance_is_valid() {
        let account = BondAccount::default();
        assert_eq!(account.available(), Amount::zero());
        assert!(!account.is_bonded());
        assert!(account.bonded_since.is_none());
    }
}
