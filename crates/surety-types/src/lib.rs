//! Surety Types - Canonical domain types for the agent surety protocol
//!
//! This crate contains all foundational types for Surety with zero dependencies
//! on other surety crates. It defines the complete type system for:
//!
//! - Identity types (`AgentId`, `ClaimId`)
//! - The fixed-point `Amount` type (6 fractional digits)
//! - Bond account and bond status types
//! - Reputation record, tier, and multiplier types
//! - Claim lifecycle types
//! - The protocol error model
//!
//! # Accounting Invariants
//!
//! These types support the core protocol invariants:
//!
//! 1. `locked <= total_bond` for every bond account, at all times
//! 2. Claims transition exactly once out of `Filed` and never again
//! 3. Every failure is a typed error, never a panic

pub mod amount;
pub mod bond;
pub mod claim;
pub mod error;
pub mod identity;
pub mod ops;
pub mod reputation;

pub use amount::*;
pub use bond::*;
pub use claim::*;
pub use error::*;
pub use identity::*;
pub use ops::*;
pub use reputation::*;
