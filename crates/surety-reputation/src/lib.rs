//! Surety Reputation Ledger - per-agent score history
//!
//! Scores start at 50 and move asymmetrically: a recorded success adds 5
//! (ceiling 100), a recorded failure subtracts 10 (floor 0). The score
//! feeds back into collateral requirements through a basis-points
//! multiplier, so agents with a bad history have to post more bond.
//!
//! The default record is materialized lazily: reads never create state,
//! only `record_success`/`record_failure` do.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use surety_types::{
    AgentId, AgentReputation, MultiplierSource, ReputationOutcomes, ReputationRecord, Result,
    SuretyError, Tier,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct ReputationState {
    records: HashMap<AgentId, ReputationRecord>,
    updaters: HashSet<AgentId>,
}

/// The reputation ledger
#[derive(Clone)]
pub struct ReputationLedger {
    owner: AgentId,
    state: Arc<RwLock<ReputationState>>,
}

impl ReputationLedger {
    /// Create a reputation ledger owned by `owner`
    pub fn new(owner: AgentId) -> Self {
        Self {
            owner,
            state: Arc::new(RwLock::new(ReputationState::default())),
        }
    }

    /// Current score; 50 for an agent that has never been touched
    pub async fn score(&self, agent: &AgentId) -> u8 {
        let state = self.state.read().await;
        state
            .records
            .get(agent)
            .copied()
            .unwrap_or_default()
            .score
    }

    /// Tier label derived from the current score
    pub async fn tier(&self, agent: &AgentId) -> Tier {
        Tier::from_score(self.score(agent).await)
    }

    /// Required-bond multiplier in basis points; exactly 10000 at the
    /// default score
    pub async fn required_bond_multiplier(&self, agent: &AgentId) -> u32 {
        let state = self.state.read().await;
        state
            .records
            .get(agent)
            .copied()
            .unwrap_or_default()
            .bond_multiplier_bps()
    }

    /// Full per-agent snapshot
    pub async fn agent_stats(&self, agent: &AgentId) -> AgentReputation {
        let state = self.state.read().await;
        let record = state.records.get(agent).copied().unwrap_or_default();
        AgentReputation {
            score: record.score,
            successes: record.successes,
            failures: record.failures,
            multiplier_bps: record.bond_multiplier_bps(),
        }
    }

    /// Enable or disable an authorized updater. Owner only.
    pub async fn authorize_updater(
        &self,
        caller: &AgentId,
        identity: &AgentId,
        enabled: bool,
    ) -> Result<()> {
        if caller != &self.owner {
            return Err(SuretyError::unauthorized(
                caller.clone(),
                "authorize reputation updater",
            ));
        }
        let mut state = self.state.write().await;
        if enabled {
            state.updaters.insert(identity.clone());
        } else {
            state.updaters.remove(identity);
        }
        info!("Reputation updater {} authorized={}", identity, enabled);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReputationOutcomes for ReputationLedger {
    async fn record_success(&self, caller: &AgentId, agent: &AgentId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.updaters.contains(caller) {
            return Err(SuretyError::unauthorized(caller.clone(), "record success"));
        }
        let record = state.records.entry(agent.clone()).or_default();
        record.record_success();
        debug!("Reputation success for {} (score {})", agent, record.score);
        Ok(())
    }

    async fn record_failure(&self, caller: &AgentId, agent: &AgentId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.updaters.contains(caller) {
            return Err(SuretyError::unauthorized(caller.clone(), "record failure"));
        }
        let record = state.records.entry(agent.clone()).or_default();
        record.record_failure();
        debug!("Reputation failure for {} (score {})", agent, record.score);
        Ok(())
    }

    async fn is_authorized(&self, caller: &AgentId) -> bool {
        let state = self.state.read().await;
        state.updaters.contains(caller)
    }
}

#[async_trait::async_trait]
impl MultiplierSource for ReputationLedger {
    async fn multiplier_bps(&self, agent: &AgentId) -> u32 {
        self.required_bond_multiplier(agent).await
    }
}
