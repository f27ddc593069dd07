//! Claim lifecycle types
//!
//! A claim moves through a closed state machine:
//!
//! ```text
//! Filed ──▶ ResolvedValid
//!    └────▶ ResolvedInvalid
//! ```
//!
//! Both resolved states are terminal. A claim is mutated exactly once by
//! resolution and is immutable afterwards.

use crate::{AgentId, Amount, ClaimId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Filed and awaiting arbitration
    Filed,
    /// Arbiter found the claim valid; defendant was slashed
    ResolvedValid,
    /// Arbiter found the claim invalid; claimant's stake forfeited
    ResolvedInvalid,
}

impl ClaimStatus {
    /// Check if this is a terminal state
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::ResolvedValid | Self::ResolvedInvalid)
    }
}

/// A claim filed by one agent against a bonded defendant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Sequential 1-based identifier
    pub id: ClaimId,
    /// Agent that filed the claim
    pub claimant: AgentId,
    /// Bonded agent the claim is against
    pub defendant: AgentId,
    /// Amount claimed, locked against the defendant's bond
    pub amount: Amount,
    /// Stake escrowed from the claimant at filing
    pub claimant_stake: Amount,
    /// Opaque descriptive evidence (tx hash, link, description)
    pub evidence: String,
    /// Current state
    pub status: ClaimStatus,
    /// When the claim was filed
    pub filed_at: DateTime<Utc>,
    /// Set at resolution, never before
    pub resolved_at: Option<DateTime<Utc>>,
    /// Free-text arbiter rationale, set at resolution
    pub resolution: Option<String>,
}

/// Aggregate claim-side statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimStats {
    /// Claims filed, cumulative
    pub filed: u64,
    /// Claims resolved (either way), cumulative
    pub resolved: u64,
    /// Cumulative value paid to prevailing claimants (claim amounts only)
    pub payouts: Amount,
}

impl ClaimStats {
    pub fn pending(&self) -> u64 {
        self.filed - self.resolved
    }
}

/// Protocol-wide statistics combining all three ledgers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolStats {
    pub total_deposited: Amount,
    pub total_slashed: Amount,
    pub active_agents: u64,
    pub claims_filed: u64,
    pub claims_resolved: u64,
    pub claims_pending: u64,
    pub total_payouts: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!ClaimStatus::Filed.is_resolved());
        assert!(ClaimStatus::ResolvedValid.is_resolved());
        assert!(ClaimStatus::ResolvedInvalid.is_resolved());
    }

    #[test]
    fn test_status_serializes_by_name() {
        assert_eq!(
            serde_json::to_string(&ClaimStatus::ResolvedValid).unwrap(),
            "\"ResolvedValid\""
        );
    }

    #[test]
    fn test_pending_count() {
        let stats = ClaimStats {
            filed: 5,
            resolved: 3,
            payouts: Amount::from_units(120),
        };
        assert_eq!(stats.pending(), 2);
    }
}
