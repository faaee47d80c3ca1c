use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use vote_ledger_shared::types::{ItemId, NewVote, UserId, VoteId, VoteRecord};

use crate::interfaces::check_cast;
use crate::{LedgerWrite, Retraction, VoteLedger, VoteLedgerError};

/// An append-only vote ledger held in memory.
///
/// Records are kept in insertion order. Inserts and commits take the write lock
/// for the whole check-then-append sequence, so the live-vote uniqueness check
/// cannot race and a commit is never observed half-applied.
#[derive(Default)]
pub struct InMemoryVoteLedger {
    records: RwLock<Vec<VoteRecord>>,
}

impl InMemoryVoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record, in insertion order.
    pub fn snapshot(&self) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        Ok(self.read()?.clone())
    }

    /// Appends a record as-is, bypassing the live-vote constraint.
    ///
    /// Only meant to seed ledgers that already violate the invariant.
    pub fn insert_unchecked(&self, vote: NewVote) -> Result<VoteRecord, VoteLedgerError> {
        let record = vote.into_record(Uuid::new_v4());
        self.write()?.push(record.clone());
        Ok(record)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<VoteRecord>>, VoteLedgerError> {
        self.records
            .read()
            .map_err(|_| VoteLedgerError::Unavailable("ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<VoteRecord>>, VoteLedgerError> {
        self.records
            .write()
            .map_err(|_| VoteLedgerError::Unavailable("ledger lock poisoned".to_string()))
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<VoteRecord>, VoteLedgerError>
    where
        F: Fn(&VoteRecord) -> bool,
    {
        let mut matching: Vec<VoteRecord> = self
            .read()?
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        matching.sort_by_key(|record| record.voted_at);
        Ok(matching)
    }
}

#[async_trait]
impl VoteLedger for InMemoryVoteLedger {
    async fn find_live_vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        kind: &str,
    ) -> Result<Option<VoteRecord>, VoteLedgerError> {
        Ok(self
            .read()?
            .iter()
            .find(|r| r.item_id == item_id && r.user_id == user_id && r.kind == kind && r.is_live())
            .cloned())
    }

    async fn find_all_live_votes(
        &self,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.select(|r| r.item_id == item_id && r.user_id == user_id && r.is_live())
    }

    async fn insert(&self, vote: NewVote) -> Result<VoteRecord, VoteLedgerError> {
        let mut records = self.write()?;
        if vote.is_live()
            && records.iter().any(|r| {
                r.item_id == vote.item_id
                    && r.user_id == vote.user_id
                    && r.kind == vote.kind
                    && !r.cancelled
            })
        {
            return Err(VoteLedgerError::conflict(vote.item_id, vote.user_id, vote.kind));
        }
        let record = vote.into_record(Uuid::new_v4());
        records.push(record.clone());
        Ok(record)
    }

    async fn mark_cancelled(&self, record_id: VoteId) -> Result<bool, VoteLedgerError> {
        let mut records = self.write()?;
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or(VoteLedgerError::RecordNotFound(record_id))?;
        if record.cancelled {
            return Ok(false);
        }
        record.cancelled = true;
        Ok(true)
    }

    async fn commit(
        &self,
        retractions: Vec<Retraction>,
        cast: Option<NewVote>,
    ) -> Result<LedgerWrite, VoteLedgerError> {
        if let Some(vote) = &cast {
            check_cast(vote)?;
        }
        let mut records = self.write()?;

        // Everything is validated before the first mutation.
        let mut pending: Vec<(usize, NewVote)> = Vec::with_capacity(retractions.len());
        for retraction in retractions {
            let index = records
                .iter()
                .position(|r| r.id == retraction.record_id)
                .ok_or(VoteLedgerError::RecordNotFound(retraction.record_id))?;
            retraction.check(&records[index])?;
            if !records[index].cancelled && !pending.iter().any(|(i, _)| *i == index) {
                pending.push((index, retraction.unvote));
            }
        }
        if let Some(vote) = &cast {
            let taken = records.iter().enumerate().any(|(index, r)| {
                r.item_id == vote.item_id
                    && r.user_id == vote.user_id
                    && r.kind == vote.kind
                    && !r.cancelled
                    && !pending.iter().any(|(i, _)| *i == index)
            });
            if taken {
                return Err(VoteLedgerError::conflict(
                    vote.item_id,
                    vote.user_id,
                    vote.kind.clone(),
                ));
            }
        }

        let mut write = LedgerWrite::default();
        for (index, unvote) in pending {
            records[index].cancelled = true;
            write.retracted.push(records[index].id);
            records.push(unvote.into_record(Uuid::new_v4()));
        }
        if let Some(vote) = cast {
            let record = vote.into_record(Uuid::new_v4());
            records.push(record.clone());
            write.cast = Some(record);
        }
        Ok(write)
    }

    async fn find_live_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.select(|r| r.item_id == item_id && r.is_live())
    }

    async fn find_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.select(|r| r.item_id == item_id)
    }

    async fn find_user_votes_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.select(|r| r.user_id == user_id && r.is_live() && r.voted_at > since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(item: ItemId, user: UserId, kind: &str, power: i64) -> NewVote {
        NewVote::cast(item, "posts", user, kind, power, Utc::now())
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_is_found() {
        let ledger = InMemoryVoteLedger::new();
        let (item, user) = (Uuid::new_v4(), Uuid::new_v4());

        let record = ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap();
        assert!(!record.id.is_nil());

        let found = ledger.find_live_vote(item, user, "smallUpvote").await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_second_live_insert_conflicts() {
        let ledger = InMemoryVoteLedger::new();
        let (item, user) = (Uuid::new_v4(), Uuid::new_v4());

        ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap();
        let err = ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap_err();
        assert!(err.is_conflict());

        // Other kinds and other users are unaffected.
        ledger.insert(draft(item, user, "bigDownvote", -5)).await.unwrap();
        ledger.insert(draft(item, Uuid::new_v4(), "smallUpvote", 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_unvote_insert_does_not_conflict() {
        let ledger = InMemoryVoteLedger::new();
        let (item, user) = (Uuid::new_v4(), Uuid::new_v4());

        let record = ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap();
        ledger.insert(record.unvote(Utc::now())).await.unwrap();
        assert_eq!(ledger.find_votes_for_item(item).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_cancelled_is_conditional() {
        let ledger = InMemoryVoteLedger::new();
        let record = ledger
            .insert(draft(Uuid::new_v4(), Uuid::new_v4(), "smallUpvote", 1))
            .await
            .unwrap();

        assert!(ledger.mark_cancelled(record.id).await.unwrap());
        assert!(!ledger.mark_cancelled(record.id).await.unwrap());
        assert!(matches!(
            ledger.mark_cancelled(Uuid::new_v4()).await,
            Err(VoteLedgerError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_retract_is_conditional() {
        let ledger = InMemoryVoteLedger::new();
        let record = ledger
            .insert(draft(Uuid::new_v4(), Uuid::new_v4(), "smallUpvote", 1))
            .await
            .unwrap();

        assert!(ledger.retract(record.id, record.unvote(Utc::now())).await.unwrap());
        assert!(!ledger.retract(record.id, record.unvote(Utc::now())).await.unwrap());
        assert!(matches!(
            ledger.retract(Uuid::new_v4(), record.unvote(Utc::now())).await,
            Err(VoteLedgerError::RecordNotFound(_))
        ));
        assert!(
            ledger
                .find_live_vote(record.item_id, record.user_id, "smallUpvote")
                .await
                .unwrap()
                .is_none()
        );

        // One cancelled record plus exactly one unvote.
        let history = ledger.find_votes_for_item(record.item_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().map(|r| r.power).sum::<i64>(), 0);
    }

    #[tokio::test]
    async fn test_commit_exchange_writes_everything() {
        let ledger = InMemoryVoteLedger::new();
        let (item, user) = (Uuid::new_v4(), Uuid::new_v4());
        let up = ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap();

        let write = ledger
            .commit(
                vec![Retraction::of(&up, Utc::now())],
                Some(draft(item, user, "bigDownvote", -5)),
            )
            .await
            .unwrap();

        assert_eq!(write.retracted, vec![up.id]);
        assert_eq!(write.cast.as_ref().map(|r| r.power), Some(-5));
        let live = ledger.find_all_live_votes(item, user).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].kind, "bigDownvote");
        let history = ledger.find_votes_for_item(item).await.unwrap();
        assert_eq!(history.iter().map(|r| r.power).sum::<i64>(), -5);
    }

    #[tokio::test]
    async fn test_conflicting_commit_writes_nothing() {
        let ledger = InMemoryVoteLedger::new();
        let (item, user) = (Uuid::new_v4(), Uuid::new_v4());
        let up = ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap();
        ledger.insert(draft(item, user, "bigDownvote", -5)).await.unwrap();

        let err = ledger
            .commit(
                vec![Retraction::of(&up, Utc::now())],
                Some(draft(item, user, "bigDownvote", -5)),
            )
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        let snapshot = ledger.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|r| r.is_live()));
    }

    #[tokio::test]
    async fn test_commit_rejects_mismatched_unvotes() {
        let ledger = InMemoryVoteLedger::new();
        let (item, user) = (Uuid::new_v4(), Uuid::new_v4());
        let up = ledger.insert(draft(item, user, "smallUpvote", 1)).await.unwrap();
        let other = ledger.insert(draft(item, user, "agree", 1)).await.unwrap();

        let live_draft = ledger
            .commit(vec![Retraction::new(up.id, draft(item, user, "smallUpvote", -1))], None)
            .await;
        assert!(matches!(live_draft, Err(VoteLedgerError::InvalidRecord(_))));

        let wrong_record = ledger
            .commit(vec![Retraction::new(up.id, other.unvote(Utc::now()))], None)
            .await;
        assert!(matches!(wrong_record, Err(VoteLedgerError::InvalidRecord(_))));

        let unvote_as_cast = ledger.commit(Vec::new(), Some(up.unvote(Utc::now()))).await;
        assert!(matches!(unvote_as_cast, Err(VoteLedgerError::InvalidRecord(_))));

        assert_eq!(ledger.find_all_live_votes(item, user).await.unwrap().len(), 2);
        assert_eq!(ledger.snapshot().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_user_votes_since_only_returns_recent_live_votes() {
        let ledger = InMemoryVoteLedger::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let mut old = draft(Uuid::new_v4(), user, "smallUpvote", 1);
        old.voted_at = now - chrono::Duration::days(2);
        ledger.insert(old).await.unwrap();
        let recent = ledger.insert(draft(Uuid::new_v4(), user, "smallUpvote", 1)).await.unwrap();
        let cancelled = ledger.insert(draft(Uuid::new_v4(), user, "smallUpvote", 1)).await.unwrap();
        ledger.retract(cancelled.id, cancelled.unvote(now)).await.unwrap();

        let votes = ledger
            .find_user_votes_since(user, now - chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].id, recent.id);
    }
}
