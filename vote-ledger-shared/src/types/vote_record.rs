use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ItemId, UserId, VoteId};

/// Represents one entry of the vote ledger.
///
/// A record is written once per cast or retraction and is never mutated in place
/// except for its `cancelled` flag. Retractions are recorded as a separate "unvote"
/// entry carrying the negated power, so summing `power` over every record of an item
/// always yields the same value as summing over the live records only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRecord {
    pub id: VoteId,
    pub item_id: ItemId,
    pub item_collection: String,
    pub user_id: UserId,
    pub kind: String,
    /// Signed weight captured at cast time.
    pub power: i64,
    pub cancelled: bool,
    pub is_unvote: bool,
    pub voted_at: DateTime<Utc>,
    /// Authors of the item at cast time.
    pub author_ids: Vec<UserId>,
}

impl VoteRecord {
    /// A vote is live while it has not been cancelled and is not itself an unvote.
    pub fn is_live(&self) -> bool {
        !self.cancelled && !self.is_unvote
    }

    /// Builds the compensating unvote for this record.
    ///
    /// The unvote carries the negated power and is born cancelled, so it never
    /// counts as a live vote.
    pub fn unvote(&self, now: DateTime<Utc>) -> NewVote {
        NewVote {
            item_id: self.item_id,
            item_collection: self.item_collection.clone(),
            user_id: self.user_id,
            kind: self.kind.clone(),
            power: -self.power,
            cancelled: true,
            is_unvote: true,
            voted_at: now,
            author_ids: self.author_ids.clone(),
        }
    }

    /// Whether this vote was cast on content the voter authored.
    pub fn is_self_vote(&self) -> bool {
        self.author_ids.contains(&self.user_id)
    }
}

/// A ledger entry that has not been persisted yet.
///
/// The store assigns the identifier on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewVote {
    pub item_id: ItemId,
    pub item_collection: String,
    pub user_id: UserId,
    pub kind: String,
    pub power: i64,
    pub cancelled: bool,
    pub is_unvote: bool,
    pub voted_at: DateTime<Utc>,
    pub author_ids: Vec<UserId>,
}

impl NewVote {
    /// Creates a live vote draft.
    pub fn cast(
        item_id: ItemId,
        item_collection: impl Into<String>,
        user_id: UserId,
        kind: impl Into<String>,
        power: i64,
        voted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id,
            item_collection: item_collection.into(),
            user_id,
            kind: kind.into(),
            power,
            cancelled: false,
            is_unvote: false,
            voted_at,
            author_ids: Vec::new(),
        }
    }

    /// Attaches the item's authors to the draft.
    pub fn with_authors(mut self, author_ids: Vec<UserId>) -> Self {
        self.author_ids = author_ids;
        self
    }

    /// Whether the persisted record will count as a live vote.
    pub fn is_live(&self) -> bool {
        !self.cancelled && !self.is_unvote
    }

    /// Turns the draft into a record with the given identifier.
    pub fn into_record(self, id: VoteId) -> VoteRecord {
        VoteRecord {
            id,
            item_id: self.item_id,
            item_collection: self.item_collection,
            user_id: self.user_id,
            kind: self.kind,
            power: self.power,
            cancelled: self.cancelled,
            is_unvote: self.is_unvote,
            voted_at: self.voted_at,
            author_ids: self.author_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_unvote_negates_power_and_is_not_live() {
        let now = Utc::now();
        let record = NewVote::cast(Uuid::new_v4(), "posts", Uuid::new_v4(), "bigUpvote", 7, now)
            .into_record(Uuid::new_v4());
        assert!(record.is_live());

        let unvote = record.unvote(now);
        assert_eq!(unvote.power, -7);
        assert!(unvote.cancelled);
        assert!(unvote.is_unvote);
        assert!(!unvote.is_live());
        assert_eq!(unvote.kind, "bigUpvote");
    }

    #[test]
    fn test_self_vote_detection() {
        let user = Uuid::new_v4();
        let record = NewVote::cast(Uuid::new_v4(), "posts", user, "smallUpvote", 1, Utc::now())
            .with_authors(vec![user])
            .into_record(Uuid::new_v4());
        assert!(record.is_self_vote());
    }
}
