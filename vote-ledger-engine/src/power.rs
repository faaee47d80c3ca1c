//! Power policies resolve the weight a vote carries at cast time.
//!
//! The resolved power is captured on the ledger record and never recomputed, so a
//! voter's later karma changes do not affect past votes.
use vote_ledger_shared::types::{PowerScaling, VoteTypeDefinition, Voter};

/// Resolves the power of a vote cast by a given voter.
pub trait PowerPolicy: Send + Sync {
    fn resolve_power(&self, voter: &Voter, definition: &VoteTypeDefinition) -> i64;
}

/// Uses the registry's `base_power` unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePowerPolicy;

impl PowerPolicy for BasePowerPolicy {
    fn resolve_power(&self, _voter: &Voter, definition: &VoteTypeDefinition) -> i64 {
        definition.base_power
    }
}

/// Scales `base_power` with the voter's karma according to the kind's `PowerScaling`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KarmaPowerPolicy;

/// (minimum karma, multiplier), highest threshold first.
const SMALL_VOTE_STEPS: [(i64, i64); 2] = [(25_000, 3), (1_000, 2)];

const STRONG_VOTE_STEPS: [(i64, i64); 15] = [
    (500_000, 16),
    (250_000, 15),
    (175_000, 14),
    (100_000, 13),
    (75_000, 12),
    (50_000, 11),
    (25_000, 10),
    (10_000, 9),
    (5_000, 8),
    (2_500, 7),
    (1_000, 6),
    (500, 5),
    (250, 4),
    (100, 3),
    (10, 2),
];

fn step_multiplier(steps: &[(i64, i64)], karma: i64) -> i64 {
    steps
        .iter()
        .find(|(threshold, _)| karma >= *threshold)
        .map_or(1, |(_, multiplier)| *multiplier)
}

impl KarmaPowerPolicy {
    pub fn small_vote_multiplier(karma: i64) -> i64 {
        step_multiplier(&SMALL_VOTE_STEPS, karma)
    }

    pub fn strong_vote_multiplier(karma: i64) -> i64 {
        step_multiplier(&STRONG_VOTE_STEPS, karma)
    }
}

impl PowerPolicy for KarmaPowerPolicy {
    fn resolve_power(&self, voter: &Voter, definition: &VoteTypeDefinition) -> i64 {
        let multiplier = match definition.scaling {
            PowerScaling::Fixed => 1,
            PowerScaling::Small => Self::small_vote_multiplier(voter.karma),
            PowerScaling::Strong => Self::strong_vote_multiplier(voter.karma),
        };
        definition.base_power * multiplier
    }
}
