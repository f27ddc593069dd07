//! Reputation types
//!
//! Scores live on a 0-100 scale and start at 50 for every agent. The
//! asymmetric step sizes (+5 success, -10 failure) bias the protocol
//! toward caution: losing trust is twice as fast as earning it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score assigned to an agent that has never been touched
pub const DEFAULT_SCORE: u8 = 50;

/// Score gained on a recorded success
pub const SUCCESS_STEP: u8 = 5;

/// Score lost on a recorded failure
pub const FAILURE_STEP: u8 = 10;

/// Multiplier returned at [`DEFAULT_SCORE`] (10000 bps = 100%)
pub const BASELINE_MULTIPLIER_BPS: u32 = 10_000;

/// Per-agent reputation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationRecord {
    /// Current score, clamped to 0..=100
    pub score: u8,
    /// Monotonically increasing success counter
    pub successes: u64,
    /// Monotonically increasing failure counter
    pub failures: u64,
}

impl Default for ReputationRecord {
    fn default() -> Self {
        Self {
            score: DEFAULT_SCORE,
            successes: 0,
            failures: 0,
        }
    }
}

impl ReputationRecord {
    /// Apply a success outcome: +5, clamped to 100
    pub fn record_success(&mut self) {
        self.score = self.score.saturating_add(SUCCESS_STEP).min(100);
        self.successes += 1;
    }

    /// Apply a failure outcome: -10, clamped to 0
    pub fn record_failure(&mut self) {
        self.score = self.score.saturating_sub(FAILURE_STEP);
        self.failures += 1;
    }

    pub fn tier(&self) -> Tier {
        Tier::from_score(self.score)
    }

    /// Required-bond multiplier in basis points.
    ///
    /// Linear in score, monotonically non-increasing: 15000 bps at score 0,
    /// exactly 10000 bps at the default score of 50, 5000 bps at 100.
    pub fn bond_multiplier_bps(&self) -> u32 {
        15_000 - 100 * self.score as u32
    }
}

/// Human-readable reputation tier derived from score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Excellent,
    Good,
    Neutral,
    Poor,
    Bad,
}

impl Tier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Neutral,
            20..=39 => Self::Poor,
            _ => Self::Bad,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Neutral => "Neutral",
            Self::Poor => "Poor",
            Self::Bad => "Bad",
        };
        write!(f, "{}", label)
    }
}

/// Snapshot returned by per-agent reputation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReputation {
    pub score: u8,
    pub successes: u64,
    pub failures: u64,
    pub multiplier_bps: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record() {
        let record = ReputationRecord::default();
        assert_eq!(record.score, 50);
        assert_eq!(record.bond_multiplier_bps(), BASELINE_MULTIPLIER_BPS);
        assert_eq!(record.tier(), Tier::Neutral);
    }

    #[test]
    fn test_score_clamping() {
        let mut record = ReputationRecord::default();
        for _ in 0..20 {
            record.record_success();
        }
        assert_eq!(record.score, 100);
        assert_eq!(record.successes, 20);

        for _ in 0..20 {
            record.record_failure();
        }
        assert_eq!(record.score, 0);
        assert_eq!(record.failures, 20);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_score(100), Tier::Excellent);
        assert_eq!(Tier::from_score(80), Tier::Excellent);
        assert_eq!(Tier::from_score(79), Tier::Good);
        assert_eq!(Tier::from_score(60), Tier::Good);
        assert_eq!(Tier::from_score(59), Tier::Neutral);
        assert_eq!(Tier::from_score(40), Tier::Neutral);
        assert_eq!(Tier::from_score(39), Tier::Poor);
        assert_eq!(Tier::from_score(20), Tier::Poor);
        assert_eq!(Tier::from_score(19), Tier::Bad);
        assert_eq!(Tier::from_score(0), Tier::Bad);
    }

    #[test]
    fn test_multiplier_monotone_non_increasing() {
        let mut previous = u32::MAX;
        for score in 0..=100u8 {
            let record = ReputationRecord {
                score,
                successes: 0,
                failures: 0,
            };
            let bps = record.bond_multiplier_bps();
            assert!(bps <= previous, "multiplier rose between scores");
            previous = bps;
        }
    }
}
