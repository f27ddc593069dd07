//! Identity types for the Surety protocol
//!
//! Agent identities are strongly typed wrappers around UUIDs to prevent
//! accidental mixing with other ID kinds. Claim IDs are sequential and
//! assigned by the claims engine, so they wrap a plain counter instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate UUID-backed ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id_type!(AgentId, "agent", "Unique identifier for a protocol participant");

/// Sequential, 1-based claim identifier assigned at filing.
///
/// Claim IDs are gapless: the claims engine hands them out from a counter
/// held under its write guard, never from a random source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimId(pub u64);

impl ClaimId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "claim_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_display_and_parse() {
        let id = AgentId::new();
        let s = id.to_string();
        assert!(s.starts_with("agent_"));
        let parsed = AgentId::parse(&s).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_agent_id_equality() {
        let uuid = Uuid::new_v4();
        let a = AgentId::from_uuid(uuid);
        let b = AgentId::from_uuid(uuid);
        assert_eq!(a, b);
    }

    #[test]
    fn test_claim_id_ordering() {
        assert!(ClaimId(1) < ClaimId(2));
        assert_eq!(ClaimId(7).to_string(), "claim_7");
    }
}
