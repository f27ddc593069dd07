//! Surety Settlement Ledger - single-asset balance ledger for the protocol
//!
//! This ledger models the external token balances that the protocol moves
//! value between: agent accounts, the bond vault, the claims escrow, and
//! the treasury. It is:
//!
//! - Account-keyed (agents plus three well-known protocol accounts)
//! - Append-only (every movement produces an immutable entry)
//! - Conservation-preserving (transfers debit and credit atomically)
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. Every entry has a reason
//! 3. Transfers are atomic: both sides apply or neither does

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surety_types::{AgentId, Amount, Result, SuretyError};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for a ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new() -> Self {
        Self(format!("entry_{}", Uuid::new_v4()))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// An account in the settlement ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Account {
    /// An agent's external balance
    Agent(AgentId),
    /// Collateral held by the bond ledger
    BondVault,
    /// Stakes held by the claims engine while claims are pending
    ClaimsEscrow,
    /// Destination for forfeited stakes
    Treasury,
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent(id) => write!(f, "{}", id),
            Self::BondVault => write!(f, "bond_vault"),
            Self::ClaimsEscrow => write!(f, "claims_escrow"),
            Self::Treasury => write!(f, "treasury"),
        }
    }
}

/// Type of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Credit (increase) to an account
    Credit,
    /// Debit (decrease) from an account
    Debit,
}

/// Reason for a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryReason {
    /// External funds entering the ledger (bootstrap / faucet)
    Mint,
    /// Collateral posted into the bond vault
    Deposit,
    /// Collateral withdrawn back to an agent
    Withdrawal,
    /// Claimant stake escrowed at filing
    StakeEscrow,
    /// Stake refunded after a failed filing
    StakeRefund,
    /// Stake returned to a prevailing claimant
    StakeReturn,
    /// Slashed collateral paid to a prevailing claimant
    SlashPayout,
    /// Stake forfeited to the treasury on an invalid claim
    StakeForfeit,
}

/// A single ledger entry (one side of a movement)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub account: Account,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub balance_after: Amount,
    pub reason: EntryReason,
    pub created_at: DateTime<Utc>,
}

/// The settlement ledger
///
/// Thread-safe and designed for concurrent access. All mutations take the
/// account map's write guard for the full read-modify-write sequence.
#[derive(Clone)]
pub struct SettlementLedger {
    /// Account balances
    accounts: Arc<RwLock<HashMap<Account, Amount>>>,
    /// All entries (append-only)
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl SettlementLedger {
    /// Create a new in-memory ledger
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the balance of an account
    pub async fn balance(&self, account: &Account) -> Amount {
        let accounts = self.accounts.read().await;
        accounts.get(account).copied().unwrap_or(Amount::zero())
    }

    /// Mint external funds into an account (bootstrap / test fixture)
    pub async fn mint(&self, account: &Account, amount: Amount) -> Result<Amount> {
        if amount.is_zero() {
            return Err(SuretyError::invalid_amount(
                "Amount must be greater than zero",
            ));
        }

        let mut accounts = self.accounts.write().await;
        let mut entries = self.entries.write().await;

        let balance = accounts.entry(account.clone()).or_default();
        let new_balance = balance
            .checked_add(amount)
            .ok_or_else(|| SuretyError::invalid_amount("Balance overflow"))?;
        *balance = new_balance;

        entries.push(LedgerEntry {
            entry_id: EntryId::new(),
            account: account.clone(),
            entry_type: EntryType::Credit,
            amount,
            balance_after: new_balance,
            reason: EntryReason::Mint,
            created_at: Utc::now(),
        });

        Ok(new_balance)
    }

    /// Move value between two accounts atomically.
    ///
    /// Both sides are validated before either is applied, so a failure
    /// leaves the ledger untouched.
    pub async fn transfer(
        &self,
        from: &Account,
        to: &Account,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<()> {
        if amount.is_zero() {
            return Err(SuretyError::invalid_amount(
                "Amount must be greater than zero",
            ));
        }

        let mut accounts = self.accounts.write().await;
        let mut entries = self.entries.write().await;

        let from_balance = accounts.get(from).copied().unwrap_or(Amount::zero());
        let new_from = from_balance.checked_sub(amount).ok_or_else(|| {
            SuretyError::InsufficientBalance {
                account: from.to_string(),
                requested: amount,
                available: from_balance,
            }
        })?;

        let to_balance = accounts.get(to).copied().unwrap_or(Amount::zero());
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| SuretyError::invalid_amount("Balance overflow"))?;

        // Both sides validated; apply together
        accounts.insert(from.clone(), new_from);
        accounts.insert(to.clone(), new_to);

        let now = Utc::now();
        entries.push(LedgerEntry {
            entry_id: EntryId::new(),
            account: from.clone(),
            entry_type: EntryType::Debit,
            amount,
            balance_after: new_from,
            reason,
            created_at: now,
        });
        entries.push(LedgerEntry {
            entry_id: EntryId::new(),
            account: to.clone(),
            entry_type: EntryType::Credit,
            amount,
            balance_after: new_to,
            reason,
            created_at: now,
        });

        debug!("Transfer {} from {} to {} ({:?})", amount, from, to, reason);
        Ok(())
    }

    /// Get all entries for an account
    pub async fn account_entries(&self, account: &Account) -> Vec<LedgerEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| &e.account == account)
            .cloned()
            .collect()
    }

    /// Get the total number of entries
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Sum of all balances. Constant across transfers; grows only on mint.
    pub async fn total_issued(&self) -> Amount {
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .fold(Amount::zero(), |acc, b| {
                acc.checked_add(*b).unwrap_or(Amount::new(u64::MAX))
            })
    }
}

impl Default for SettlementLedger {
    fn default() -> Self {
        Self::new()
    }
}
