#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;
use vote_ledger_engine::{
    CollaboratorError, EngineConfig, ManualClock, Notifier, SearchIndexer, VoteEngine,
};
use vote_ledger_repository::{
    InMemoryItemRepository, InMemoryUserRepository, InMemoryVoteLedger, ItemRepository,
    ItemRepositoryError, LedgerWrite, Retraction, VoteLedger, VoteLedgerError,
};
use vote_ledger_shared::types::{
    ItemId, ItemScores, NewVote, ScoredItem, UserId, VoteId, VotePayload, VoteRecord, Voter,
};

pub const POSTS: &str = "posts";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// In-memory stores shared by an engine under test.
pub struct Stores {
    pub ledger: Arc<InMemoryVoteLedger>,
    pub items: Arc<InMemoryItemRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub clock: Arc<ManualClock>,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(InMemoryVoteLedger::new()),
            items: Arc::new(InMemoryItemRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            clock: Arc::new(ManualClock::new(start_time())),
        }
    }

    /// Test configuration: one quick score retry and no rate limits.
    pub fn config() -> EngineConfig {
        EngineConfig::default()
            .with_recalculation_retries(1)
            .without_rate_limits()
    }

    pub fn engine(&self) -> VoteEngine {
        self.engine_with(Self::config())
    }

    pub fn engine_with(&self, config: EngineConfig) -> VoteEngine {
        VoteEngine::new(
            self.ledger.clone(),
            self.items.clone(),
            self.users.clone(),
            config,
        )
        .with_clock(self.clock.clone())
    }

    pub fn add_item(&self, author_id: Option<UserId>) -> ScoredItem {
        let item = ScoredItem::new(Uuid::new_v4(), POSTS, author_id, start_time());
        self.items.insert(item.clone()).unwrap();
        item
    }

    pub fn add_voter(&self, karma: i64) -> Voter {
        let voter = Voter::new(Uuid::new_v4(), karma);
        self.users.insert(voter.clone()).unwrap();
        voter
    }

    pub async fn stored_item(&self, item_id: ItemId) -> ScoredItem {
        self.items.get_item(POSTS, item_id).await.unwrap().unwrap()
    }

    pub fn live_records(&self) -> Vec<VoteRecord> {
        self.ledger
            .snapshot()
            .unwrap()
            .into_iter()
            .filter(|r| r.is_live())
            .collect()
    }
}

/// Ledger wrapper that counts calls and can yield before every operation, so
/// concurrently polled requests interleave at each ledger access.
pub struct InstrumentedLedger {
    pub inner: Arc<InMemoryVoteLedger>,
    pub calls: AtomicUsize,
    pub yield_each_call: bool,
}

impl InstrumentedLedger {
    pub fn counting(inner: Arc<InMemoryVoteLedger>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            yield_each_call: false,
        }
    }

    pub fn yielding(inner: Arc<InMemoryVoteLedger>) -> Self {
        Self {
            yield_each_call: true,
            ..Self::counting(inner)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yield_each_call {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait::async_trait]
impl VoteLedger for InstrumentedLedger {
    async fn find_live_vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        kind: &str,
    ) -> Result<Option<VoteRecord>, VoteLedgerError> {
        self.enter().await;
        self.inner.find_live_vote(item_id, user_id, kind).await
    }

    async fn find_all_live_votes(
        &self,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.enter().await;
        self.inner.find_all_live_votes(item_id, user_id).await
    }

    async fn insert(&self, vote: NewVote) -> Result<VoteRecord, VoteLedgerError> {
        self.enter().await;
        self.inner.insert(vote).await
    }

    async fn mark_cancelled(&self, record_id: VoteId) -> Result<bool, VoteLedgerError> {
        self.enter().await;
        self.inner.mark_cancelled(record_id).await
    }

    async fn commit(
        &self,
        retractions: Vec<Retraction>,
        cast: Option<NewVote>,
    ) -> Result<LedgerWrite, VoteLedgerError> {
        self.enter().await;
        self.inner.commit(retractions, cast).await
    }

    async fn find_live_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.enter().await;
        self.inner.find_live_votes_for_item(item_id).await
    }

    async fn find_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.enter().await;
        self.inner.find_votes_for_item(item_id).await
    }

    async fn find_user_votes_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.enter().await;
        self.inner.find_user_votes_since(user_id, since).await
    }
}

/// How a [`FaultyLedger`] fails its commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitFault {
    /// Every commit fails as a whole.
    Unavailable,
    /// Commits carrying a cast fail as a whole; pure retractions go through.
    CastUnavailable,
    /// Commits carrying a cast report a live-vote conflict that a re-read
    /// never finds.
    PhantomConflict,
}

/// Ledger whose commits fail the way a transactional store does: nothing of
/// a failed commit is written.
pub struct FaultyLedger {
    pub inner: Arc<InMemoryVoteLedger>,
    pub fault: CommitFault,
    pub commits: AtomicUsize,
}

impl FaultyLedger {
    pub fn new(inner: Arc<InMemoryVoteLedger>, fault: CommitFault) -> Self {
        Self {
            inner,
            fault,
            commits: AtomicUsize::new(0),
        }
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VoteLedger for FaultyLedger {
    async fn find_live_vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        kind: &str,
    ) -> Result<Option<VoteRecord>, VoteLedgerError> {
        self.inner.find_live_vote(item_id, user_id, kind).await
    }

    async fn find_all_live_votes(
        &self,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.inner.find_all_live_votes(item_id, user_id).await
    }

    async fn insert(&self, vote: NewVote) -> Result<VoteRecord, VoteLedgerError> {
        self.inner.insert(vote).await
    }

    async fn mark_cancelled(&self, record_id: VoteId) -> Result<bool, VoteLedgerError> {
        self.inner.mark_cancelled(record_id).await
    }

    async fn commit(
        &self,
        retractions: Vec<Retraction>,
        cast: Option<NewVote>,
    ) -> Result<LedgerWrite, VoteLedgerError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        let failure = match (self.fault, cast.as_ref()) {
            (CommitFault::Unavailable, _) | (CommitFault::CastUnavailable, Some(_)) => Some(
                VoteLedgerError::Unavailable("transaction rolled back".to_string()),
            ),
            (CommitFault::PhantomConflict, Some(vote)) => Some(VoteLedgerError::conflict(
                vote.item_id,
                vote.user_id,
                vote.kind.clone(),
            )),
            _ => None,
        };
        match failure {
            Some(error) => Err(error),
            None => self.inner.commit(retractions, cast).await,
        }
    }

    async fn find_live_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.inner.find_live_votes_for_item(item_id).await
    }

    async fn find_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.inner.find_votes_for_item(item_id).await
    }

    async fn find_user_votes_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.inner.find_user_votes_since(user_id, since).await
    }
}

/// Item repository whose score updates fail while `failing` is set.
pub struct FlakyItems {
    pub inner: Arc<InMemoryItemRepository>,
    pub failing: AtomicBool,
}

impl FlakyItems {
    pub fn new(inner: Arc<InMemoryItemRepository>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ItemRepository for FlakyItems {
    async fn get_item(
        &self,
        collection: &str,
        item_id: ItemId,
    ) -> Result<Option<ScoredItem>, ItemRepositoryError> {
        self.inner.get_item(collection, item_id).await
    }

    async fn update_scores(
        &self,
        collection: &str,
        item_id: ItemId,
        scores: ItemScores,
    ) -> Result<(), ItemRepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ItemRepositoryError::Unavailable("primary down".to_string()));
        }
        self.inner.update_scores(collection, item_id, scores).await
    }

    async fn list_item_ids(&self, collection: &str) -> Result<Vec<ItemId>, ItemRepositoryError> {
        self.inner.list_item_ids(collection).await
    }
}

#[derive(Default)]
pub struct RecordingIndexer {
    pub resynced: Mutex<Vec<ItemId>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl SearchIndexer for RecordingIndexer {
    async fn resync_document(&self, item: &ScoredItem) -> Result<(), CollaboratorError> {
        self.resynced.lock().unwrap().push(item.id);
        if self.fail {
            return Err(CollaboratorError::search_index("connection refused"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub emitted: Mutex<Vec<(String, VotePayload)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn names(&self) -> Vec<String> {
        self.emitted
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn emit(&self, event_name: &str, payload: &VotePayload) -> Result<(), CollaboratorError> {
        self.emitted
            .lock()
            .unwrap()
            .push((event_name.to_string(), payload.clone()));
        if self.fail {
            return Err(CollaboratorError::notification("queue unavailable"));
        }
        Ok(())
    }
}
