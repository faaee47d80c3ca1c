use serde::{Deserialize, Serialize};

use crate::types::{ScoredItem, UserId, VoteRecord};

/// The kind of event emitted once a vote transition has been persisted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VoteEventKind {
    /// A live vote was cast.
    Cast,
    /// A live vote was retracted.
    Retract,
    /// A rate-limit rule flagged the voter for moderation.
    VotingPatternFlag,
}

impl VoteEventKind {
    /// The notification name collaborators subscribe to.
    pub fn event_name(&self) -> &'static str {
        match self {
            VoteEventKind::Cast => "votes.cast.async",
            VoteEventKind::Retract => "votes.retract.async",
            VoteEventKind::VotingPatternFlag => "moderation.voting_pattern",
        }
    }
}

/// Data handed to notification collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VotePayload {
    pub item: ScoredItem,
    pub vote: VoteRecord,
    pub user_id: UserId,
}

/// An event produced by a persisted vote transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteEvent {
    pub kind: VoteEventKind,
    pub payload: VotePayload,
}

impl VoteEvent {
    pub fn new(kind: VoteEventKind, item: ScoredItem, vote: VoteRecord) -> Self {
        let user_id = vote.user_id;
        Self {
            kind,
            payload: VotePayload {
                item,
                vote,
                user_id,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.event_name()
    }
}
