//! Cross-ledger operation seams
//!
//! The claims engine mutates the bond and reputation ledgers through these
//! traits, injected at construction. The real ledgers implement them; tests
//! substitute in-memory fakes. Nothing in the protocol reaches for a global.

use crate::{AgentId, Amount, BondProtocolStats, Result};
use async_trait::async_trait;

/// Bond-side operations the claims engine depends on.
///
/// `lock`, `release`, and `slash` are capability-gated: the ledger checks
/// the presented caller identity against its authorized-caller set.
#[async_trait]
pub trait BondOperations: Send + Sync {
    /// Whether the agent has a non-zero bond
    async fn is_bonded(&self, agent: &AgentId) -> bool;

    /// The agent's total bond (locked portion included)
    async fn bond_amount(&self, agent: &AgentId) -> Amount;

    /// Earmark part of the agent's available bond against a claim
    async fn lock(&self, caller: &AgentId, agent: &AgentId, amount: Amount) -> Result<()>;

    /// Reverse an earmark without touching the total bond
    async fn release(&self, caller: &AgentId, agent: &AgentId, amount: Amount) -> Result<()>;

    /// Remove locked bond value for good. The caller pays out the slashed
    /// value; the ledger only adjusts its books.
    async fn slash(&self, caller: &AgentId, agent: &AgentId, amount: Amount) -> Result<()>;

    /// Whether the caller is on the authorized-caller list
    async fn is_authorized(&self, caller: &AgentId) -> bool;

    /// Aggregate bond-side statistics
    async fn protocol_stats(&self) -> BondProtocolStats;
}

/// Reputation outcomes recorded by the claims engine at resolution
#[async_trait]
pub trait ReputationOutcomes: Send + Sync {
    /// +5 score, clamped to 100
    async fn record_success(&self, caller: &AgentId, agent: &AgentId) -> Result<()>;

    /// -10 score, clamped to 0
    async fn record_failure(&self, caller: &AgentId, agent: &AgentId) -> Result<()>;

    /// Whether the caller is on the authorized-updater list
    async fn is_authorized(&self, caller: &AgentId) -> bool;
}

/// Read-only view of the reputation multiplier, used by the bond ledger
/// to scale minimum-bond requirements.
#[async_trait]
pub trait MultiplierSource: Send + Sync {
    /// Required-bond multiplier in basis points (10000 = no adjustment)
    async fn multiplier_bps(&self, agent: &AgentId) -> u32;
}
