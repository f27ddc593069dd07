//! Error types for the Surety protocol
//!
//! Every operation returns a typed result; no error is silently swallowed
//! and none is fatal to the process. A failed operation can be re-invoked
//! once its precondition is corrected.

use crate::{AgentId, Amount, ClaimId};
use thiserror::Error;

/// Result type for Surety operations
pub type Result<T> = std::result::Result<T, SuretyError>;

/// Surety protocol error kinds
#[derive(Debug, Clone, Error)]
pub enum SuretyError {
    /// Amount is below the required minimum, zero, or arithmetically invalid
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Requested more than the unlocked portion of a bond
    #[error("Insufficient available bond: requested {requested}, available {available}")]
    InsufficientAvailable {
        requested: Amount,
        available: Amount,
    },

    /// External balance too low to fund a transfer or escrow
    #[error("Insufficient balance in {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: String,
        requested: Amount,
        available: Amount,
    },

    /// Defendant has no bond posted
    #[error("Agent {agent} is not bonded")]
    NotBonded { agent: AgentId },

    /// Claim amount exceeds the defendant's total bond
    #[error("Claim exceeds bond: requested {requested}, bonded {bonded}")]
    ExceedsBond { requested: Amount, bonded: Amount },

    /// Claimant and defendant must be different agents
    #[error("Agent {agent} cannot file a claim against itself")]
    InvalidParty { agent: AgentId },

    /// Unknown claim ID
    #[error("Claim {claim_id} not found")]
    NotFound { claim_id: ClaimId },

    /// Claim is no longer in the Filed state
    #[error("Claim {claim_id} has already been resolved")]
    AlreadyResolved { claim_id: ClaimId },

    /// Caller is absent from the relevant authorization or arbiter set
    #[error("Unauthorized: {caller} - {action}")]
    Unauthorized { caller: AgentId, action: String },

    /// Lock/release accounting inconsistency
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl SuretyError {
    /// Create an invalid-amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(caller: AgentId, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller,
            action: action.into(),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Machine-readable error kind for the handler layer
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InsufficientAvailable { .. } => "INSUFFICIENT_AVAILABLE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::NotBonded { .. } => "NOT_BONDED",
            Self::ExceedsBond { .. } => "EXCEEDS_BOND",
            Self::InvalidParty { .. } => "INVALID_PARTY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyResolved { .. } => "ALREADY_RESOLVED",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::InvalidState { .. } => "INVALID_STATE",
        }
    }
}
