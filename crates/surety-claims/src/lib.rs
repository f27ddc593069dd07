//! Surety Claims Engine - claim lifecycle and cross-ledger settlement
//!
//! The claims engine is where the three ledgers meet. Filing a claim
//! escrows a stake from the claimant and locks the claimed amount on the
//! defendant's bond; arbitration either slashes the defendant and pays
//! the claimant (valid) or releases the lock and forfeits the stake to
//! the treasury (invalid). Reputation outcomes are recorded on valid
//! resolutions.
//!
//! # State machine
//!
//! ```text
//! Filed ──▶ ResolvedValid
//!    └────▶ ResolvedInvalid
//! ```
//!
//! Both resolved states are terminal.
//!
//! # Atomicity
//!
//! Cross-ledger sequences inside `file_claim` and `resolve_claim` are
//! atomic as a unit: a failed bond lock rolls the stake escrow back, and
//! resolution preflights every authorization it needs before the first
//! mutation so the multi-ledger sequence cannot fail halfway on a
//! misconfigured capability. The bond and reputation ledgers are injected
//! as trait objects at construction, never reached through globals.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use surety_ledger::{Account, EntryReason, SettlementLedger};
use surety_types::{
    AgentId, Amount, BondOperations, Claim, ClaimId, ClaimStats, ClaimStatus, ProtocolStats,
    ReputationOutcomes, Result, SuretyError,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Minimum claimant stake: 5 currency units
pub const MIN_STAKE: Amount = Amount(5_000_000);

/// Stake is one tenth of the claim amount, floored at [`MIN_STAKE`]
const STAKE_DIVISOR: u64 = 10;

/// Stake required to file a claim of `amount`.
///
/// Integer division truncates toward zero: a 50-unit claim stakes 5
/// units (the floor), a 1000-unit claim stakes 100.
pub fn required_stake(amount: Amount) -> Amount {
    let tenth = Amount::new(amount.value() / STAKE_DIVISOR);
    tenth.max(MIN_STAKE)
}

#[derive(Default)]
struct ClaimsState {
    claims: HashMap<ClaimId, Claim>,
    by_claimant: HashMap<AgentId, Vec<ClaimId>>,
    against_defendant: HashMap<AgentId, Vec<ClaimId>>,
    arbiters: HashSet<AgentId>,
    next_id: u64,
    stats: ClaimStats,
}

/// The claims engine
#[derive(Clone)]
pub struct ClaimsEngine {
    owner: AgentId,
    /// Identity this engine presents to the bond and reputation ledgers.
    /// Bootstrap must place it on both authorized-caller lists.
    engine_id: AgentId,
    bonds: Arc<dyn BondOperations>,
    reputation: Arc<dyn ReputationOutcomes>,
    settlement: SettlementLedger,
    state: Arc<RwLock<ClaimsState>>,
}

impl ClaimsEngine {
    /// Create a claims engine owned by `owner`.
    ///
    /// `bonds` and `reputation` are the injected cross-ledger seams;
    /// tests substitute in-memory fakes.
    pub fn new(
        owner: AgentId,
        engine_id: AgentId,
        bonds: Arc<dyn BondOperations>,
        reputation: Arc<dyn ReputationOutcomes>,
        settlement: SettlementLedger,
    ) -> Self {
        Self {
            owner,
            engine_id,
            bonds,
            reputation,
            settlement,
            state: Arc::new(RwLock::new(ClaimsState {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Identity the engine presents to the other ledgers
    pub fn engine_id(&self) -> &AgentId {
        &self.engine_id
    }

    /// File a claim against a bonded defendant.
    ///
    /// Escrows the claimant's stake and locks the claimed amount on the
    /// defendant's bond. If the lock fails (for example because other
    /// pending claims already hold the available portion), the stake
    /// escrow is rolled back and the filing fails as a whole.
    ///
    /// Returns the new sequential claim ID.
    pub async fn file_claim(
        &self,
        claimant: &AgentId,
        defendant: &AgentId,
        amount: Amount,
        evidence: impl Into<String>,
    ) -> Result<ClaimId> {
        if claimant == defendant {
            return Err(SuretyError::InvalidParty {
                agent: claimant.clone(),
            });
        }
        if amount.is_zero() {
            return Err(SuretyError::invalid_amount(
                "claim amount must be greater than zero",
            ));
        }

        // Hold the write guard across the whole filing: claim IDs stay
        // gapless and concurrent filings serialize.
        let mut state = self.state.write().await;

        if !self.bonds.is_bonded(defendant).await {
            return Err(SuretyError::NotBonded {
                agent: defendant.clone(),
            });
        }
        let bonded = self.bonds.bond_amount(defendant).await;
        // Checked against the total bond, not the available portion: a
        // claim may be filed while other claims hold part of the bond,
        // as long as the nominal total covers it.
        if amount > bonded {
            return Err(SuretyError::ExceedsBond {
                requested: amount,
                bonded,
            });
        }

        let stake = required_stake(amount);
        self.settlement
            .transfer(
                &Account::Agent(claimant.clone()),
                &Account::ClaimsEscrow,
                stake,
                EntryReason::StakeEscrow,
            )
            .await?;

        if let Err(lock_err) = self
            .bonds
            .lock(&self.engine_id, defendant, amount)
            .await
        {
            warn!(
                "Claim filing against {} failed at bond lock, refunding stake: {}",
                defendant, lock_err
            );
            self.settlement
                .transfer(
                    &Account::ClaimsEscrow,
                    &Account::Agent(claimant.clone()),
                    stake,
                    EntryReason::StakeRefund,
                )
                .await
                .map_err(|refund_err| {
                    SuretyError::invalid_state(format!(
                        "stake refund failed after bond lock failure: {}",
                        refund_err
                    ))
                })?;
            return Err(lock_err);
        }

        let id = ClaimId(state.next_id);
        state.next_id += 1;

        let claim = Claim {
            id,
            claimant: claimant.clone(),
            defendant: defendant.clone(),
            amount,
            claimant_stake: stake,
            evidence: evidence.into(),
            status: ClaimStatus::Filed,
            filed_at: Utc::now(),
            resolved_at: None,
            resolution: None,
        };

        state.claims.insert(id, claim);
        state
            .by_claimant
            .entry(claimant.clone())
            .or_default()
            .push(id);
        state
            .against_defendant
            .entry(defendant.clone())
            .or_default()
            .push(id);
        state.stats.filed += 1;

        info!(
            "Claim {} filed: {} vs {} for {} (stake {})",
            id, claimant, defendant, amount, stake
        );
        Ok(id)
    }

    /// Resolve a filed claim. Caller must be on the arbiter set.
    ///
    /// `valid=true` slashes the defendant, pays the claimant the claimed
    /// amount plus the returned stake, and records reputation outcomes.
    /// `valid=false` releases the lock and forfeits the stake to the
    /// treasury; reputation is untouched.
    pub async fn resolve_claim(
        &self,
        arbiter: &AgentId,
        claim_id: ClaimId,
        valid: bool,
        resolution_note: impl Into<String>,
    ) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.arbiters.contains(arbiter) {
            return Err(SuretyError::unauthorized(arbiter.clone(), "resolve claim"));
        }

        let (claimant, defendant, amount, stake) = {
            let claim = state
                .claims
                .get(&claim_id)
                .ok_or(SuretyError::NotFound { claim_id })?;
            if claim.status.is_resolved() {
                return Err(SuretyError::AlreadyResolved { claim_id });
            }
            (
                claim.claimant.clone(),
                claim.defendant.clone(),
                claim.amount,
                claim.claimant_stake,
            )
        };

        // Preflight the capabilities this resolution needs, so the
        // cross-ledger sequence below cannot fail halfway on a
        // misconfigured authorization.
        if !self.bonds.is_authorized(&self.engine_id).await {
            return Err(SuretyError::unauthorized(
                self.engine_id.clone(),
                "mutate bond ledger",
            ));
        }
        if valid && !self.reputation.is_authorized(&self.engine_id).await {
            return Err(SuretyError::unauthorized(
                self.engine_id.clone(),
                "record reputation outcome",
            ));
        }

        if valid {
            self.bonds
                .slash(&self.engine_id, &defendant, amount)
                .await?;
            // The slashed value is paid out here, atomically with the
            // bookkeeping above.
            self.settlement
                .transfer(
                    &Account::BondVault,
                    &Account::Agent(claimant.clone()),
                    amount,
                    EntryReason::SlashPayout,
                )
                .await?;
            self.settlement
                .transfer(
                    &Account::ClaimsEscrow,
                    &Account::Agent(claimant.clone()),
                    stake,
                    EntryReason::StakeReturn,
                )
                .await?;
            self.reputation
                .record_failure(&self.engine_id, &defendant)
                .await?;
            self.reputation
                .record_success(&self.engine_id, &claimant)
                .await?;

            state.stats.payouts = state
                .stats
                .payouts
                .checked_add(amount)
                .ok_or_else(|| SuretyError::invalid_amount("payout counter overflow"))?;
        } else {
            self.bonds
                .release(&self.engine_id, &defendant, amount)
                .await?;
            // Frivolous-claim deterrent: the stake goes to the treasury,
            // not back to the claimant.
            self.settlement
                .transfer(
                    &Account::ClaimsEscrow,
                    &Account::Treasury,
                    stake,
                    EntryReason::StakeForfeit,
                )
                .await?;
        }

        let note = resolution_note.into();
        let claim = state
            .claims
            .get_mut(&claim_id)
            .ok_or(SuretyError::NotFound { claim_id })?;
        claim.status = if valid {
            ClaimStatus::ResolvedValid
        } else {
            ClaimStatus::ResolvedInvalid
        };
        claim.resolved_at = Some(Utc::now());
        claim.resolution = Some(note);
        state.stats.resolved += 1;

        info!(
            "Claim {} resolved by {} as {}",
            claim_id,
            arbiter,
            if valid { "valid" } else { "invalid" }
        );
        Ok(())
    }

    /// Add or remove an arbiter. Owner only.
    pub async fn set_arbiter(
        &self,
        caller: &AgentId,
        identity: &AgentId,
        enabled: bool,
    ) -> Result<()> {
        if caller != &self.owner {
            return Err(SuretyError::unauthorized(caller.clone(), "manage arbiters"));
        }
        let mut state = self.state.write().await;
        if enabled {
            state.arbiters.insert(identity.clone());
        } else {
            state.arbiters.remove(identity);
        }
        info!("Arbiter {} enabled={}", identity, enabled);
        Ok(())
    }

    /// Whether the identity may resolve claims
    pub async fn is_arbiter(&self, identity: &AgentId) -> bool {
        let state = self.state.read().await;
        state.arbiters.contains(identity)
    }

    /// Look up a claim by ID
    pub async fn claim(&self, claim_id: ClaimId) -> Result<Claim> {
        let state = self.state.read().await;
        state
            .claims
            .get(&claim_id)
            .cloned()
            .ok_or(SuretyError::NotFound { claim_id })
    }

    /// IDs of claims filed by the agent
    pub async fn claims_by_claimant(&self, agent: &AgentId) -> Vec<ClaimId> {
        let state = self.state.read().await;
        state.by_claimant.get(agent).cloned().unwrap_or_default()
    }

    /// IDs of claims filed against the agent
    pub async fn claims_against_defendant(&self, agent: &AgentId) -> Vec<ClaimId> {
        let state = self.state.read().await;
        state
            .against_defendant
            .get(agent)
            .cloned()
            .unwrap_or_default()
    }

    /// Claim-side aggregate counters
    pub async fn stats(&self) -> ClaimStats {
        let state = self.state.read().await;
        state.stats
    }

    /// Protocol-wide statistics across all three ledgers
    pub async fn protocol_stats(&self) -> ProtocolStats {
        let bonds = self.bonds.protocol_stats().await;
        let claims = self.stats().await;
        ProtocolStats {
            total_deposited: bonds.total_deposited,
            total_slashed: bonds.total_slashed,
            active_agents: bonds.active_agents,
            claims_filed: claims.filed,
            claims_resolved: claims.resolved,
            claims_pending: claims.pending(),
            total_payouts: claims.payouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_bonds::BondLedger;
    use surety_reputation::ReputationLedger;
    use surety_types::{BondProtocolStats, MultiplierSource};

    /// Full protocol wiring, mirroring the bootstrap sequence: deploy the
    /// three ledgers, authorize the claims engine on both, add an arbiter.
    struct Protocol {
        settlement: SettlementLedger,
        bonds: Arc<BondLedger>,
        reputation: Arc<ReputationLedger>,
        claims: ClaimsEngine,
        arbiter: AgentId,
        agent1: AgentId,
        agent2: AgentId,
    }

    async fn deploy() -> Protocol {
        let owner = AgentId::new();
        let arbiter = AgentId::new();
        let agent1 = AgentId::new();
        let agent2 = AgentId::new();

        let settlement = SettlementLedger::new();
        let reputation = Arc::new(ReputationLedger::new(owner.clone()));
        let bonds = Arc::new(BondLedger::new(
            owner.clone(),
            settlement.clone(),
            reputation.clone() as Arc<dyn MultiplierSource>,
        ));

        let engine_id = AgentId::new();
        let claims = ClaimsEngine::new(
            owner.clone(),
            engine_id.clone(),
            bonds.clone() as Arc<dyn BondOperations>,
            reputation.clone() as Arc<dyn surety_types::ReputationOutcomes>,
            settlement.clone(),
        );

        // Cross-ledger authorization
        bonds
            .authorize_caller(&owner, &engine_id, true)
            .await
            .unwrap();
        reputation
            .authorize_updater(&owner, &engine_id, true)
            .await
            .unwrap();
        claims.set_arbiter(&owner, &arbiter, true).await.unwrap();

        // Fund the agents' external balances
        for agent in [&agent1, &agent2] {
            settlement
                .mint(&Account::Agent(agent.clone()), Amount::from_units(10_000))
                .await
                .unwrap();
        }

        Protocol {
            settlement,
            bonds,
            reputation,
            claims,
            arbiter,
            agent1,
            agent2,
        }
    }

    async fn balance(p: &Protocol, agent: &AgentId) -> Amount {
        p.settlement.balance(&Account::Agent(agent.clone())).await
    }

    #[test]
    fn test_required_stake() {
        // 10% of the claim, floored at 5 units
        assert_eq!(required_stake(Amount::from_units(50)), Amount::from_units(5));
        assert_eq!(
            required_stake(Amount::from_units(1000)),
            Amount::from_units(100)
        );
        assert_eq!(required_stake(Amount::from_units(1)), Amount::from_units(5));
        // Truncation toward zero before the floor kicks in
        assert_eq!(
            required_stake(Amount::from_units(55)),
            Amount::new(5_500_000)
        );
    }

    #[tokio::test]
    async fn test_file_claim_records_claim() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let id = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(50), "tx:0x123")
            .await
            .unwrap();
        assert_eq!(id, ClaimId(1));

        let claim = p.claims.claim(id).await.unwrap();
        assert_eq!(claim.claimant, p.agent2);
        assert_eq!(claim.defendant, p.agent1);
        assert_eq!(claim.amount, Amount::from_units(50));
        assert_eq!(claim.claimant_stake, Amount::from_units(5));
        assert_eq!(claim.status, ClaimStatus::Filed);
        assert!(claim.resolved_at.is_none());

        assert_eq!(p.claims.claims_by_claimant(&p.agent2).await, vec![id]);
        assert_eq!(p.claims.claims_against_defendant(&p.agent1).await, vec![id]);
    }

    #[tokio::test]
    async fn test_file_claim_locks_defendant_bond() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        p.claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(50), "tx:0x123")
            .await
            .unwrap();

        let status = p.bonds.status(&p.agent1).await;
        assert_eq!(status.locked, Amount::from_units(50));
        assert_eq!(status.total_bond, Amount::from_units(100));
        assert_eq!(status.available, Amount::from_units(50));
    }

    #[tokio::test]
    async fn test_self_claim_rejected() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let result = p
            .claims
            .file_claim(&p.agent1, &p.agent1, Amount::from_units(10), "self")
            .await;
        assert!(matches!(result, Err(SuretyError::InvalidParty { .. })));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let result = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::zero(), "nothing")
            .await;
        assert!(matches!(result, Err(SuretyError::InvalidAmount { .. })));
    }

    #[tokio::test]
    async fn test_unbonded_defendant_rejected() {
        let p = deploy().await;
        let result = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(10), "tx:0xabc")
            .await;
        assert!(matches!(result, Err(SuretyError::NotBonded { .. })));
    }

    #[tokio::test]
    async fn test_claim_exceeding_bond_rejected() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let result = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(150), "tx:0xabc")
            .await;
        assert!(matches!(result, Err(SuretyError::ExceedsBond { .. })));
    }

    #[tokio::test]
    async fn test_lock_failure_rolls_back_stake() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        // First claim holds 60 of the bond
        p.claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(60), "tx:0x1")
            .await
            .unwrap();

        // A second claim for 80 passes the total-bond check (80 <= 100)
        // but fails at the lock (only 40 available). The stake must come
        // back and no claim ID may be burned.
        let before = balance(&p, &p.agent2).await;
        let result = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(80), "tx:0x2")
            .await;
        assert!(matches!(
            result,
            Err(SuretyError::InsufficientAvailable { .. })
        ));
        assert_eq!(balance(&p, &p.agent2).await, before);

        let next = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(40), "tx:0x3")
            .await
            .unwrap();
        assert_eq!(next, ClaimId(2));
    }

    #[tokio::test]
    async fn test_insufficient_stake_balance() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let broke = AgentId::new();
        let result = p
            .claims
            .file_claim(&broke, &p.agent1, Amount::from_units(50), "tx:0xdef")
            .await;
        assert!(matches!(
            result,
            Err(SuretyError::InsufficientBalance { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_valid_pays_claimant() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let before = balance(&p, &p.agent2).await;
        let id = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(50), "tx:0x123")
            .await
            .unwrap();
        p.claims
            .resolve_claim(&p.arbiter, id, true, "Claim validated")
            .await
            .unwrap();

        // Claim amount plus the stake back: net +50 against the pre-filing
        // balance
        let after = balance(&p, &p.agent2).await;
        assert_eq!(after, before.checked_add(Amount::from_units(50)).unwrap());

        let status = p.bonds.status(&p.agent1).await;
        assert_eq!(status.total_bond, Amount::from_units(50));
        assert_eq!(status.locked, Amount::zero());

        assert_eq!(p.reputation.score(&p.agent1).await, 40);
        assert_eq!(p.reputation.score(&p.agent2).await, 55);

        let claim = p.claims.claim(id).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::ResolvedValid);
        assert!(claim.resolved_at.is_some());
        assert_eq!(claim.resolution.as_deref(), Some("Claim validated"));
    }

    #[tokio::test]
    async fn test_resolve_invalid_forfeits_stake() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let before = balance(&p, &p.agent2).await;
        let id = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(50), "tx:0x123")
            .await
            .unwrap();
        p.claims
            .resolve_claim(&p.arbiter, id, false, "No evidence of breach")
            .await
            .unwrap();

        // Stake gone to the treasury, bond untouched, lock released
        let after = balance(&p, &p.agent2).await;
        assert_eq!(after, before.checked_sub(Amount::from_units(5)).unwrap());
        assert_eq!(
            p.settlement.balance(&Account::Treasury).await,
            Amount::from_units(5)
        );

        let status = p.bonds.status(&p.agent1).await;
        assert_eq!(status.total_bond, Amount::from_units(100));
        assert_eq!(status.locked, Amount::zero());

        // Reputation untouched on invalid resolution
        assert_eq!(p.reputation.score(&p.agent1).await, 50);
        assert_eq!(p.reputation.score(&p.agent2).await, 50);

        let claim = p.claims.claim(id).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::ResolvedInvalid);
    }

    #[tokio::test]
    async fn test_resolve_twice_rejected() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let id = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(50), "tx:0x123")
            .await
            .unwrap();
        p.claims
            .resolve_claim(&p.arbiter, id, true, "Claim validated")
            .await
            .unwrap();

        let result = p
            .claims
            .resolve_claim(&p.arbiter, id, false, "Changed my mind")
            .await;
        assert!(matches!(result, Err(SuretyError::AlreadyResolved { .. })));
    }

    #[tokio::test]
    async fn test_resolve_unknown_claim() {
        let p = deploy().await;
        let result = p
            .claims
            .resolve_claim(&p.arbiter, ClaimId(42), true, "?")
            .await;
        assert!(matches!(result, Err(SuretyError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_non_arbiter_cannot_resolve() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();

        let id = p
            .claims
            .file_claim(&p.agent2, &p.agent1, Amount::from_units(50), "tx:0x123")
            .await
            .unwrap();

        let stranger = AgentId::new();
        let result = p
            .claims
            .resolve_claim(&stranger, id, true, "not my call")
            .await;
        assert!(matches!(result, Err(SuretyError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_filing_ids_gapless() {
        let p = deploy().await;
        p.bonds
            .deposit(&p.agent1, Amount::from_units(1000))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let claims = p.claims.clone();
            let claimant = p.agent2.clone();
            let defendant = p.agent1.clone();
            handles.push(tokio::spawn(async move {
                claims
                    .file_claim(&claimant, &defendant, Amount::from_units(100), "tx:0xcc")
                    .await
                    .unwrap()
            }));
        }

        let mut ids: Vec<u64> = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().value());
        }
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_full_claim_lifecycle() {
        let p = deploy().await;

        // 1. Agent1 posts bond
        p.bonds
            .deposit(&p.agent1, Amount::from_units(100))
            .await
            .unwrap();
        assert!(p.bonds.is_bonded(&p.agent1).await);

        // 2. Something goes wrong, Agent2 files a claim for 50 (stake 5)
        let issued = p.settlement.total_issued().await;
        let id = p
            .claims
            .file_claim(
                &p.agent2,
                &p.agent1,
                Amount::from_units(50),
                "Service not delivered: tx:0xabc123",
            )
            .await
            .unwrap();

        // 3. Arbiter resolves the claim as valid
        p.claims
            .resolve_claim(&p.arbiter, id, true, "Evidence confirms failure to deliver")
            .await
            .unwrap();

        // 4. Final state
        let claim = p.claims.claim(id).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::ResolvedValid);

        assert_eq!(p.bonds.bond_amount(&p.agent1).await, Amount::from_units(50));
        assert_eq!(p.reputation.score(&p.agent1).await, 40);
        assert_eq!(p.reputation.score(&p.agent2).await, 55);

        let stats = p.claims.stats().await;
        assert_eq!(stats.filed, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.pending(), 0);
        assert_eq!(stats.payouts, Amount::from_units(50));

        let protocol = p.claims.protocol_stats().await;
        assert_eq!(protocol.total_deposited, Amount::from_units(50));
        assert_eq!(protocol.total_slashed, Amount::from_units(50));
        assert_eq!(protocol.active_agents, 1);
        assert_eq!(protocol.claims_pending, 0);

        // Money is conserved end to end
        assert_eq!(p.settlement.total_issued().await, issued);
    }

    // ── Fake-ledger substitution (the injected seams in action) ──────────

    /// Bond fake whose lock always fails, for exercising the escrow
    /// rollback path in isolation.
    struct RefusingBonds;

    #[async_trait::async_trait]
    impl BondOperations for RefusingBonds {
        async fn is_bonded(&self, _agent: &AgentId) -> bool {
            true
        }
        async fn bond_amount(&self, _agent: &AgentId) -> Amount {
            Amount::from_units(1_000_000)
        }
        async fn lock(&self, _caller: &AgentId, _agent: &AgentId, _amount: Amount) -> Result<()> {
            Err(SuretyError::invalid_state("lock refused"))
        }
        async fn release(
            &self,
            _caller: &AgentId,
            _agent: &AgentId,
            _amount: Amount,
        ) -> Result<()> {
            Ok(())
        }
        async fn slash(&self, _caller: &AgentId, _agent: &AgentId, _amount: Amount) -> Result<()> {
            Ok(())
        }
        async fn is_authorized(&self, _caller: &AgentId) -> bool {
            true
        }
        async fn protocol_stats(&self) -> BondProtocolStats {
            BondProtocolStats::default()
        }
    }

    struct NoopReputation;

    #[async_trait::async_trait]
    impl surety_types::ReputationOutcomes for NoopReputation {
        async fn record_success(&self, _caller: &AgentId, _agent: &AgentId) -> Result<()> {
            Ok(())
        }
        async fn record_failure(&self, _caller: &AgentId, _agent: &AgentId) -> Result<()> {
            Ok(())
        }
        async fn is_authorized(&self, _caller: &AgentId) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_stake_refund_with_fake_bond_ledger() {
        let owner = AgentId::new();
        let settlement = SettlementLedger::new();
        let claims = ClaimsEngine::new(
            owner.clone(),
            AgentId::new(),
            Arc::new(RefusingBonds),
            Arc::new(NoopReputation),
            settlement.clone(),
        );

        let claimant = AgentId::new();
        let defendant = AgentId::new();
        settlement
            .mint(&Account::Agent(claimant.clone()), Amount::from_units(100))
            .await
            .unwrap();

        let result = claims
            .file_claim(&claimant, &defendant, Amount::from_units(50), "tx:0xff")
            .await;
        assert!(matches!(result, Err(SuretyError::InvalidState { .. })));

        // Escrow fully unwound
        assert_eq!(
            settlement.balance(&Account::Agent(claimant)).await,
            Amount::from_units(100)
        );
        assert_eq!(
            settlement.balance(&Account::ClaimsEscrow).await,
            Amount::zero()
        );
    }
}
