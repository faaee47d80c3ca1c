//! This module defines the `VoteLedger` trait, which provides an interface
//! for interacting with the append-only store of vote records.
//! It abstracts the database operations for appending, cancelling and querying votes.
use chrono::{DateTime, Utc};
use vote_ledger_shared::types::{ItemId, NewVote, UserId, VoteId, VoteRecord};

use crate::errors::VoteLedgerError;

/// A live record to cancel, paired with the unvote that compensates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retraction {
    pub record_id: VoteId,
    pub unvote: NewVote,
}

impl Retraction {
    pub fn new(record_id: VoteId, unvote: NewVote) -> Self {
        Self { record_id, unvote }
    }

    /// Builds the retraction of a live record, stamping the unvote with `now`.
    pub fn of(record: &VoteRecord, now: DateTime<Utc>) -> Self {
        Self::new(record.id, record.unvote(now))
    }

    /// Checks that the unvote exactly compensates `record`.
    pub fn check(&self, record: &VoteRecord) -> Result<(), VoteLedgerError> {
        let unvote = &self.unvote;
        if !unvote.is_unvote || !unvote.cancelled {
            return Err(VoteLedgerError::InvalidRecord(format!(
                "retraction of {} carries a live record instead of an unvote",
                self.record_id
            )));
        }
        if unvote.item_id != record.item_id
            || unvote.user_id != record.user_id
            || unvote.kind != record.kind
            || unvote.power != -record.power
        {
            return Err(VoteLedgerError::InvalidRecord(format!(
                "unvote does not compensate record {}",
                self.record_id
            )));
        }
        Ok(())
    }
}

/// What one [`VoteLedger::commit`] call wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerWrite {
    /// Records cancelled by this call, in the order given.
    pub retracted: Vec<VoteId>,
    pub cast: Option<VoteRecord>,
}

impl LedgerWrite {
    pub fn is_empty(&self) -> bool {
        self.retracted.is_empty() && self.cast.is_none()
    }
}

/// Rejects a cast draft that would not be persisted as a live vote.
pub(crate) fn check_cast(cast: &NewVote) -> Result<(), VoteLedgerError> {
    if cast.is_live() {
        Ok(())
    } else {
        Err(VoteLedgerError::InvalidRecord(format!(
            "cast of {} on {} is not a live vote",
            cast.kind, cast.item_id
        )))
    }
}

/// A trait that defines the interface for interacting with the vote ledger.
///
/// The ledger only ever grows: records are inserted and may later be flagged as
/// cancelled, but never updated otherwise nor deleted. Implementors must refuse to
/// insert a live record when another live record exists for the same item, user
/// and kind.
#[async_trait::async_trait]
pub trait VoteLedger: Send + Sync {
    /// Finds the live vote of a user on an item for one vote kind.
    ///
    /// # Arguments
    ///
    /// * `item_id` - The voted-on item.
    /// * `user_id` - The voter.
    /// * `kind` - The vote kind name.
    ///
    /// # Returns
    ///
    /// The live record if one exists, or a `VoteLedgerError` if the lookup fails.
    async fn find_live_vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        kind: &str,
    ) -> Result<Option<VoteRecord>, VoteLedgerError>;

    /// Finds every live vote of a user on an item, across all kinds.
    ///
    /// Used to find votes of the same exclusivity group that must be retracted.
    ///
    /// # Arguments
    ///
    /// * `item_id` - The voted-on item.
    /// * `user_id` - The voter.
    ///
    /// # Returns
    ///
    /// The live records ordered by `voted_at`, or a `VoteLedgerError`.
    async fn find_all_live_votes(
        &self,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError>;

    /// Appends a record to the ledger.
    ///
    /// # Arguments
    ///
    /// * `vote` - The record draft; the ledger assigns its identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(VoteRecord)` - The persisted record
    /// * `Err(VoteLedgerError::Conflict)` - A live record already exists for the same
    ///   item, user and kind
    /// * `Err(VoteLedgerError)` - Any other storage failure
    async fn insert(&self, vote: NewVote) -> Result<VoteRecord, VoteLedgerError>;

    /// Flags a record as cancelled, without appending its unvote.
    ///
    /// The update is conditional on the record still being live, so two concurrent
    /// cancellations of the same record cannot both succeed. Retractions go through
    /// [`VoteLedger::commit`], which pairs the cancellation with its unvote.
    ///
    /// # Arguments
    ///
    /// * `record_id` - The record to cancel.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - This call cancelled the record
    /// * `Ok(false)` - The record was already cancelled
    /// * `Err(VoteLedgerError::RecordNotFound)` - No such record
    async fn mark_cancelled(&self, record_id: VoteId) -> Result<bool, VoteLedgerError>;

    /// Applies the writes of one vote transition atomically.
    ///
    /// Every retraction flags its record as cancelled and appends the matching
    /// unvote, then the cast (if any) is appended. Either every write lands or
    /// none does. Cancellation is conditional on the record still being live, so
    /// two concurrent retractions of the same record cannot both succeed; a
    /// retraction whose record is no longer live is skipped.
    ///
    /// # Arguments
    ///
    /// * `retractions` - The live records to retract, with their unvotes.
    /// * `cast` - The live vote to append after the retractions.
    ///
    /// # Returns
    ///
    /// * `Ok(LedgerWrite)` - The records this call retracted and the cast record
    /// * `Err(VoteLedgerError::Conflict)` - The cast collides with another live
    ///   vote; nothing was written
    /// * `Err(VoteLedgerError::RecordNotFound)` - A retracted record does not exist
    /// * `Err(VoteLedgerError::InvalidRecord)` - An unvote does not compensate its
    ///   record, or the cast is not a live vote
    async fn commit(
        &self,
        retractions: Vec<Retraction>,
        cast: Option<NewVote>,
    ) -> Result<LedgerWrite, VoteLedgerError>;

    /// Retracts a single record: cancels it and appends its unvote atomically.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - This call retracted the record
    /// * `Ok(false)` - The record was already cancelled
    /// * `Err(VoteLedgerError)` - As for [`VoteLedger::commit`]
    async fn retract(&self, record_id: VoteId, unvote: NewVote) -> Result<bool, VoteLedgerError> {
        let write = self
            .commit(vec![Retraction::new(record_id, unvote)], None)
            .await?;
        Ok(!write.retracted.is_empty())
    }

    /// Returns every live vote on an item, from all users.
    async fn find_live_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError>;

    /// Returns every record of an item, cancelled and unvotes included.
    async fn find_votes_for_item(&self, item_id: ItemId)
    -> Result<Vec<VoteRecord>, VoteLedgerError>;

    /// Returns the live votes a user cast since the given instant, on any item.
    async fn find_user_votes_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError>;
}
