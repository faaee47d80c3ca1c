//! Synchronous vote hooks.
//!
//! Hooks run in registration order on the resolved proposal, after every check and
//! before the first ledger write. Each hook receives the proposal returned by the
//! previous one. Returning an error vetoes the vote.
use vote_ledger_shared::types::{NewVote, ScoredItem, VoteRecord, VoteTransition, Voter};

use crate::errors::HookError;

/// A transition the engine is about to write.
///
/// Everything is read-only except the power of the cast, which is the only part
/// of the proposal the engine takes back from the hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteProposal {
    item: ScoredItem,
    voter: Voter,
    transition: VoteTransition,
    retract: Vec<VoteRecord>,
    cast: Option<NewVote>,
}

impl VoteProposal {
    pub(crate) fn new(
        item: ScoredItem,
        voter: Voter,
        transition: VoteTransition,
        retract: Vec<VoteRecord>,
        cast: Option<NewVote>,
    ) -> Self {
        Self {
            item,
            voter,
            transition,
            retract,
            cast,
        }
    }

    pub fn item(&self) -> &ScoredItem {
        &self.item
    }

    pub fn voter(&self) -> &Voter {
        &self.voter
    }

    pub fn transition(&self) -> VoteTransition {
        self.transition
    }

    /// Live votes that will be cancelled and compensated with unvotes.
    pub fn retract(&self) -> &[VoteRecord] {
        &self.retract
    }

    /// The vote that will be inserted, if any.
    pub fn cast(&self) -> Option<&NewVote> {
        self.cast.as_ref()
    }

    /// Power of the proposed cast, if the transition casts a vote.
    pub fn cast_power(&self) -> Option<i64> {
        self.cast.as_ref().map(|vote| vote.power)
    }

    /// Overrides the power of the proposed cast.
    ///
    /// Returns `false`, leaving the proposal untouched, when nothing is cast.
    pub fn set_cast_power(&mut self, power: i64) -> bool {
        match self.cast.as_mut() {
            Some(vote) => {
                vote.power = power;
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
pub trait VoteHook: Send + Sync {
    /// Name used in logs and rejection errors.
    fn name(&self) -> &str;

    /// Inspects a proposal and optionally adjusts the cast power.
    ///
    /// # Arguments
    ///
    /// * `proposal` - The proposal as left by the previous hook
    ///
    /// # Returns
    ///
    /// * `Ok(VoteProposal)` - The proposal to hand to the next hook
    /// * `Err(HookError)` - Vetoes the vote; nothing is written
    async fn before_write(&self, proposal: VoteProposal) -> Result<VoteProposal, HookError>;
}
