//! Surety Bond Ledger - per-agent collateral accounting
//!
//! Agents post collateral ("bonds") that backs claims filed against them.
//! The ledger tracks three figures per agent: total bond, locked amount,
//! and the derived available amount. Locking earmarks funds against a
//! pending claim; slashing removes locked funds for good.
//!
//! # Invariants
//!
//! 1. `locked <= total_bond` for every account, at all times
//! 2. `available = total_bond - locked`, derived and never stored
//! 3. Lock, release, and slash are capability-gated by the
//!    authorized-caller set; deposits and withdrawals belong to the agent
//! 4. Every deposit and withdrawal moves value through the settlement
//!    ledger; slashing only adjusts the books — the payout is made by the
//!    authorized caller as part of the same operation

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use surety_types::{
    AgentId, Amount, BondAccount, BondOperations, BondProtocolStats, BondStatus, MultiplierSource,
    Result, SuretyError,
};
use surety_ledger::{Account, EntryReason, SettlementLedger};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Minimum single-call deposit: 10 currency units.
///
/// The floor applies to the amount in each call, not to the resulting
/// total bond.
pub const MIN_BOND: Amount = Amount(10_000_000);

/// Interior state, guarded by one lock so read-modify-write sequences on
/// any account serialize.
#[derive(Default)]
struct BondState {
    accounts: HashMap<AgentId, BondAccount>,
    authorized: HashSet<AgentId>,
    total_slashed: Amount,
}

/// The bond ledger
#[derive(Clone)]
pub struct BondLedger {
    owner: AgentId,
    settlement: SettlementLedger,
    reputation: Arc<dyn MultiplierSource>,
    state: Arc<RwLock<BondState>>,
}

impl BondLedger {
    /// Create a bond ledger owned by `owner`.
    ///
    /// The reputation source scales minimum-bond requirements; the
    /// settlement ledger carries the actual value movements.
    pub fn new(
        owner: AgentId,
        settlement: SettlementLedger,
        reputation: Arc<dyn MultiplierSource>,
    ) -> Self {
        Self {
            owner,
            settlement,
            reputation,
            state: Arc::new(RwLock::new(BondState::default())),
        }
    }

    /// Post collateral. Caller is the agent itself.
    ///
    /// Fails with `InvalidAmount` below [`MIN_BOND`]; repeated calls
    /// accumulate. `bonded_since` is set on the first deposit only.
    pub async fn deposit(&self, agent: &AgentId, amount: Amount) -> Result<()> {
        if amount < MIN_BOND {
            return Err(SuretyError::invalid_amount(format!(
                "deposit of {} is below the minimum bond of {}",
                amount, MIN_BOND
            )));
        }

        let mut state = self.state.write().await;
        let account = state.accounts.entry(agent.clone()).or_default();
        let new_total = account
            .total_bond
            .checked_add(amount)
            .ok_or_else(|| SuretyError::invalid_amount("bond balance overflow"))?;

        // Validated; move the funds, then commit the books
        self.settlement
            .transfer(
                &Account::Agent(agent.clone()),
                &Account::BondVault,
                amount,
                EntryReason::Deposit,
            )
            .await?;

        account.total_bond = new_total;
        if account.bonded_since.is_none() {
            account.bonded_since = Some(Utc::now());
        }

        info!("Bond deposit: {} by {} (total {})", amount, agent, new_total);
        Ok(())
    }

    /// Withdraw unlocked collateral. Caller is the agent itself.
    ///
    /// Never touches the locked amount.
    pub async fn withdraw(&self, agent: &AgentId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        let account = state.accounts.entry(agent.clone()).or_default();

        if amount > account.available() {
            return Err(SuretyError::InsufficientAvailable {
                requested: amount,
                available: account.available(),
            });
        }

        self.settlement
            .transfer(
                &Account::BondVault,
                &Account::Agent(agent.clone()),
                amount,
                EntryReason::Withdrawal,
            )
            .await?;

        // Cannot underflow: amount <= available <= total_bond
        account.total_bond = Amount::new(account.total_bond.value() - amount.value());

        info!(
            "Bond withdrawal: {} by {} (total {})",
            amount, agent, account.total_bond
        );
        Ok(())
    }

    fn require_authorized(state: &BondState, caller: &AgentId, action: &str) -> Result<()> {
        if !state.authorized.contains(caller) {
            return Err(SuretyError::unauthorized(caller.clone(), action));
        }
        Ok(())
    }

    /// Snapshot of an agent's bond
    pub async fn status(&self, agent: &AgentId) -> BondStatus {
        let state = self.state.read().await;
        let account = state.accounts.get(agent).cloned().unwrap_or_default();
        BondStatus {
            total_bond: account.total_bond,
            locked: account.locked,
            available: account.available(),
            bonded_since: account.bonded_since,
            is_bonded: account.is_bonded(),
        }
    }

    /// Minimum bond required of `agent` for a base requirement,
    /// scaled by the agent's reputation multiplier.
    pub async fn required_bond(&self, agent: &AgentId, base: Amount) -> Result<Amount> {
        let bps = self.reputation.multiplier_bps(agent).await;
        base.basis_points(bps)
            .ok_or_else(|| SuretyError::invalid_amount("required bond overflow"))
    }

    /// Enable or disable an authorized caller. Owner only.
    pub async fn authorize_caller(
        &self,
        caller: &AgentId,
        identity: &AgentId,
        enabled: bool,
    ) -> Result<()> {
        if caller != &self.owner {
            return Err(SuretyError::unauthorized(
                caller.clone(),
                "authorize bond caller",
            ));
        }
        let mut state = self.state.write().await;
        if enabled {
            state.authorized.insert(identity.clone());
        } else {
            state.authorized.remove(identity);
        }
        info!("Bond caller {} authorized={}", identity, enabled);
        Ok(())
    }
}

#[async_trait::async_trait]
impl BondOperations for BondLedger {
    async fn is_bonded(&self, agent: &AgentId) -> bool {
        let state = self.state.read().await;
        state
            .accounts
            .get(agent)
            .map(|a| a.is_bonded())
            .unwrap_or(false)
    }

    async fn bond_amount(&self, agent: &AgentId) -> Amount {
        let state = self.state.read().await;
        state
            .accounts
            .get(agent)
            .map(|a| a.total_bond)
            .unwrap_or(Amount::zero())
    }

    async fn lock(&self, caller: &AgentId, agent: &AgentId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        Self::require_authorized(&state, caller, "lock bond")?;

        let account = state.accounts.entry(agent.clone()).or_default();
        if amount > account.available() {
            return Err(SuretyError::InsufficientAvailable {
                requested: amount,
                available: account.available(),
            });
        }

        // Cannot overflow: locked + amount <= total_bond
        account.locked = Amount::new(account.locked.value() + amount.value());
        debug!("Bond lock: {} on {} (locked {})", amount, agent, account.locked);
        Ok(())
    }

    async fn release(&self, caller: &AgentId, agent: &AgentId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        Self::require_authorized(&state, caller, "release bond")?;

        let account = state.accounts.entry(agent.clone()).or_default();
        let new_locked = account.locked.checked_sub(amount).ok_or_else(|| {
            SuretyError::invalid_state(format!(
                "release of {} exceeds locked amount {}",
                amount, account.locked
            ))
        })?;

        account.locked = new_locked;
        debug!("Bond release: {} on {} (locked {})", amount, agent, account.locked);
        Ok(())
    }

    async fn slash(&self, caller: &AgentId, agent: &AgentId, amount: Amount) -> Result<()> {
        let mut state = self.state.write().await;
        Self::require_authorized(&state, caller, "slash bond")?;

        let account = state.accounts.entry(agent.clone()).or_default();
        let new_locked = account.locked.checked_sub(amount).ok_or_else(|| {
            SuretyError::invalid_state(format!(
                "slash of {} exceeds locked amount {}",
                amount, account.locked
            ))
        })?;

        account.locked = new_locked;
        // Cannot underflow: locked <= total_bond
        account.total_bond = Amount::new(account.total_bond.value() - amount.value());

        state.total_slashed = state
            .total_slashed
            .checked_add(amount)
            .unwrap_or(state.total_slashed);

        info!("Bond slash: {} on {}", amount, agent);
        Ok(())
    }

    async fn is_authorized(&self, caller: &AgentId) -> bool {
        let state = self.state.read().await;
        state.authorized.contains(caller)
    }

    async fn protocol_stats(&self) -> BondProtocolStats {
        let state = self.state.read().await;
        let total_deposited = state
            .accounts
            .values()
            .fold(Amount::zero(), |acc, a| {
                acc.checked_add(a.total_bond).unwrap_or(acc)
            });
        let active_agents = state.accounts.values().filter(|a| a.is_bonded()).count() as u64;
        BondProtocolStats {
            total_deposited,
            total_slashed: state.total_slashed,
            active_agents,
        }
    }
}
