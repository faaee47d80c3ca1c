use serde::{Deserialize, Serialize};

use crate::types::{ScoredItem, VoteRecord};

/// The state transition a vote request resolved to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoteTransition {
    /// No conflicting vote existed; a new live vote was cast.
    Cast,
    /// The same kind was already live and has been retracted.
    ToggleOff,
    /// A vote of another kind in the same exclusivity group was retracted and the
    /// requested kind cast in its place.
    Exchange,
    /// Nothing changed, either because the request was already satisfied by a
    /// concurrent submission or because toggling was disabled.
    Unchanged,
}

impl VoteTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteTransition::Cast => "cast",
            VoteTransition::ToggleOff => "toggle_off",
            VoteTransition::Exchange => "exchange",
            VoteTransition::Unchanged => "unchanged",
        }
    }
}

/// Result of a vote request.
///
/// In preview mode `persisted` is false and `cast` carries a nil identifier, since
/// nothing was written to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteOutcome {
    pub item: ScoredItem,
    pub transition: VoteTransition,
    pub cast: Option<VoteRecord>,
    pub retracted: Vec<VoteRecord>,
    pub persisted: bool,
    /// Set when a rate-limit rule asks the client to warn the voter.
    pub voting_pattern_warning: bool,
    /// Set when the ledger write succeeded but the item's derived fields could not
    /// be rewritten; the item is queued for repair.
    pub scores_stale: bool,
}

impl VoteOutcome {
    pub fn unchanged(item: ScoredItem, persisted: bool) -> Self {
        Self {
            item,
            transition: VoteTransition::Unchanged,
            cast: None,
            retracted: Vec::new(),
            persisted,
            voting_pattern_warning: false,
            scores_stale: false,
        }
    }
}
