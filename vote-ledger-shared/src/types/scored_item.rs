use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ItemId, UserId};

/// Represents a voted-on item and the scores derived from its ledger.
///
/// The item itself belongs to its own collection; the vote engine only ever reads it
/// and rewrites the derived fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredItem {
    pub id: ItemId,
    pub collection: String,
    pub author_id: Option<UserId>,
    pub posted_at: DateTime<Utc>,
    /// Sum of live vote powers.
    pub base_score: i64,
    /// Time-decayed ranking score.
    pub score: f64,
    /// Number of live votes.
    pub vote_count: i64,
    pub inactive: bool,
}

impl ScoredItem {
    /// Creates an item with no votes.
    pub fn new(
        id: ItemId,
        collection: impl Into<String>,
        author_id: Option<UserId>,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            collection: collection.into(),
            author_id,
            posted_at,
            base_score: 0,
            score: 0.0,
            vote_count: 0,
            inactive: false,
        }
    }

    pub fn author_ids(&self) -> Vec<UserId> {
        self.author_id.into_iter().collect()
    }

    /// Returns a copy of the item carrying the given derived scores.
    ///
    /// Applying scores always reactivates the item.
    pub fn with_scores(&self, scores: ItemScores) -> Self {
        Self {
            base_score: scores.base_score,
            score: scores.score,
            vote_count: scores.vote_count,
            inactive: false,
            ..self.clone()
        }
    }

    pub fn scores(&self) -> ItemScores {
        ItemScores {
            base_score: self.base_score,
            score: self.score,
            vote_count: self.vote_count,
        }
    }
}

/// The derived fields written back to an item after a vote transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ItemScores {
    pub base_score: i64,
    pub score: f64,
    pub vote_count: i64,
}
