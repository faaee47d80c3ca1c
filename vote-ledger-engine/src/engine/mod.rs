//! The vote engine.
//!
//! `VoteEngine::perform_vote` turns a `VoteRequest` into ledger writes and a score
//! update. Per (item, user) pair it moves between three states: no vote, a live
//! vote of the requested kind, and a live vote of another kind in the same
//! exclusivity group. The resulting transitions are toggle-off, exchange and cast.
//! The retractions and the cast of one transition reach the ledger in a single
//! commit.
//!
//! Concurrent double-submissions are collapsed: the request's intent is captured
//! before the pair's lock is taken and re-checked once it is held, so a request
//! whose intent a concurrent request already fulfilled resolves to `Unchanged`.
mod maintenance;
mod request;

pub use maintenance::{LedgerAudit, RecalculationReport};
pub use request::VoteRequest;

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use vote_ledger_repository::{ItemRepository, LedgerWrite, Retraction, UserRepository, VoteLedger};
use vote_ledger_shared::types::{
    ItemId, NewVote, ScoredItem, UserId, VoteEvent, VoteEventKind, VoteId, VoteOutcome, VoteRecord,
    VoteTransition, VoteTypeDefinition, Voter,
};

use crate::clock::{Clock, SystemClock};
use crate::collaborators::{AllowAll, PermissionChecker, vote_action};
use crate::config::EngineConfig;
use crate::dispatcher::{DispatchBatch, EventPublisher, VoteEventDispatcher};
use crate::errors::EngineError;
use crate::hooks::{VoteHook, VoteProposal};
use crate::locks::{KeyedLocks, VoteLocks};
use crate::power::{BasePowerPolicy, PowerPolicy};
use crate::rate_limit::{self, RateLimitVerdict, RateLimiter};
use crate::registry::VoteTypeRegistry;
use crate::scoring::recalculate_scores;

/// What the request meant to do, judged before the pair's lock was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Cast,
    Retract(VoteId),
}

/// The writes a transition will perform.
#[derive(Debug)]
struct Plan {
    transition: VoteTransition,
    retract: Vec<VoteRecord>,
    cast: Option<NewVote>,
    verdict: RateLimitVerdict,
}

impl Plan {
    fn unchanged() -> Self {
        Self {
            transition: VoteTransition::Unchanged,
            retract: Vec::new(),
            cast: None,
            verdict: RateLimitVerdict::default(),
        }
    }
}

/// Orchestrates vote transitions against the ledger, item and user stores.
pub struct VoteEngine {
    ledger: Arc<dyn VoteLedger>,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
    registry: Arc<VoteTypeRegistry>,
    power_policy: Arc<dyn PowerPolicy>,
    permissions: Arc<dyn PermissionChecker>,
    rate_limiter: RateLimiter,
    hooks: Vec<Arc<dyn VoteHook>>,
    clock: Arc<dyn Clock>,
    events: Option<EventPublisher>,
    locks: VoteLocks,
    score_locks: KeyedLocks<ItemId>,
    stale_items: Mutex<BTreeSet<(String, ItemId)>>,
    config: EngineConfig,
}

impl VoteEngine {
    /// Creates an engine with the default registry, base power, no permission
    /// restrictions, no hooks and no event dispatch.
    ///
    /// # Arguments
    ///
    /// * `ledger` - The vote ledger store
    /// * `items` - The store of voted-on items
    /// * `users` - The store of voters
    /// * `config` - Engine configuration
    pub fn new(
        ledger: Arc<dyn VoteLedger>,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger,
            items,
            users,
            registry: Arc::new(VoteTypeRegistry::with_defaults()),
            power_policy: Arc::new(BasePowerPolicy),
            permissions: Arc::new(AllowAll),
            rate_limiter: RateLimiter::with_defaults(),
            hooks: Vec::new(),
            clock: Arc::new(SystemClock),
            events: None,
            locks: VoteLocks::new(),
            score_locks: KeyedLocks::new(),
            stale_items: Mutex::new(BTreeSet::new()),
            config,
        }
    }

    pub fn with_registry(mut self, registry: VoteTypeRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_power_policy(mut self, policy: Arc<dyn PowerPolicy>) -> Self {
        self.power_policy = policy;
        self
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionChecker>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Appends a hook; hooks run in the order they were added.
    pub fn with_hook(mut self, hook: Arc<dyn VoteHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, publisher: EventPublisher) -> Self {
        self.events = Some(publisher);
        self
    }

    /// Spawns `dispatcher` with the configured buffer size and routes events to it.
    pub fn with_dispatcher(self, dispatcher: VoteEventDispatcher) -> (Self, JoinHandle<()>) {
        let (publisher, handle) = dispatcher.spawn(self.config.event_buffer_size);
        (self.with_events(publisher), handle)
    }

    pub fn registry(&self) -> &VoteTypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies a vote request.
    ///
    /// Permission, user, vote kind and item are validated before the ledger is
    /// read. Rate limits and hooks run before anything is written.
    ///
    /// # Arguments
    ///
    /// * `request` - The vote request
    ///
    /// # Returns
    ///
    /// * `Ok(VoteOutcome)` - The transition performed (or projected, for previews)
    ///   and the item with its recomputed scores
    /// * `Err(EngineError)` - The request was rejected or a store failed
    #[instrument(
        skip(self, request),
        fields(
            item_id = %request.item_id,
            user_id = %request.user_id,
            kind = %request.kind,
            persist = request.should_persist
        )
    )]
    pub async fn perform_vote(&self, request: VoteRequest) -> Result<VoteOutcome, EngineError> {
        let voter = self
            .users
            .get_user(request.user_id)
            .await?
            .ok_or(EngineError::UserNotFound(request.user_id))?;

        let action = vote_action(&request.item_collection, &request.kind);
        if !self.permissions.can_perform_action(&voter, &action) {
            warn!(action = %action, "Vote rejected by permission check");
            return Err(EngineError::permission_denied(voter.id, action));
        }

        let definition = self.registry.lookup(&request.kind)?.clone();
        let item = self
            .load_item(&request.item_collection, request.item_id)
            .await?;

        let existing = self
            .ledger
            .find_live_vote(item.id, voter.id, &definition.name)
            .await?;
        let intent = match existing {
            Some(_) if !request.toggle_if_already_voted => {
                debug!("Vote already present and toggling is disabled");
                return Ok(VoteOutcome::unchanged(item, false));
            }
            Some(existing) => Intent::Retract(existing.id),
            None => Intent::Cast,
        };

        if !request.should_persist {
            return self.preview(&request, &voter, &definition, item, intent).await;
        }

        let _guard = self.locks.acquire((item.id, voter.id)).await;
        self.transition_locked(&request, &voter, &definition, item, intent)
            .await
    }

    /// Retracts every live vote a user holds on an item.
    ///
    /// Used when accounts are deleted or by moderation. Needs neither a permission
    /// check nor an existing user record.
    #[instrument(skip(self))]
    pub async fn clear_votes(
        &self,
        item_collection: &str,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<VoteOutcome, EngineError> {
        let item = self.load_item(item_collection, item_id).await?;

        let _guard = self.locks.acquire((item_id, user_id)).await;
        self.clear_locked(item, user_id).await
    }

    async fn clear_locked(
        &self,
        item: ScoredItem,
        user_id: UserId,
    ) -> Result<VoteOutcome, EngineError> {
        let live = self.ledger.find_all_live_votes(item.id, user_id).await?;
        if live.is_empty() {
            return Ok(VoteOutcome::unchanged(item, false));
        }
        let retracted = self.retract_all(live).await?;
        if retracted.is_empty() {
            return Ok(VoteOutcome::unchanged(item, false));
        }

        let (item, scores_stale) = self.refresh_scores(item).await;
        let outcome = VoteOutcome {
            item,
            transition: VoteTransition::ToggleOff,
            cast: None,
            retracted,
            persisted: true,
            voting_pattern_warning: false,
            scores_stale,
        };
        self.publish_events(&outcome, false);
        info!(
            retracted = outcome.retracted.len(),
            base_score = outcome.item.base_score,
            "Votes cleared"
        );
        Ok(outcome)
    }

    async fn transition_locked(
        &self,
        request: &VoteRequest,
        voter: &Voter,
        definition: &VoteTypeDefinition,
        item: ScoredItem,
        intent: Intent,
    ) -> Result<VoteOutcome, EngineError> {
        let live = self.ledger.find_all_live_votes(item.id, voter.id).await?;
        let (live, repaired) = self.repair_duplicates(live).await?;

        let written = self
            .plan_and_commit(request, voter, definition, &item, intent, &live)
            .await;
        let (plan, write) = match written {
            Ok(Some(written)) => written,
            Ok(None) if repaired.is_empty() => {
                debug!("Request already satisfied by a concurrent vote");
                return Ok(VoteOutcome::unchanged(item, false));
            }
            Ok(None) => (Plan::unchanged(), LedgerWrite::default()),
            Err(e) => {
                if !repaired.is_empty() {
                    // The repair is already in the ledger; the scores must follow it.
                    self.refresh_scores(item).await;
                }
                return Err(e);
            }
        };

        let transition = if write.is_empty() {
            VoteTransition::Unchanged
        } else {
            plan.transition
        };
        let mut retracted = repaired;
        retracted.extend(
            plan.retract
                .into_iter()
                .filter(|record| write.retracted.contains(&record.id)),
        );
        let cast = write.cast;

        let (item, scores_stale) = self.refresh_scores(item).await;
        let outcome = VoteOutcome {
            item,
            transition,
            cast,
            retracted,
            persisted: true,
            voting_pattern_warning: plan.verdict.warning,
            scores_stale,
        };
        self.publish_events(&outcome, plan.verdict.flag_for_moderation);

        info!(
            transition = transition.as_str(),
            base_score = outcome.item.base_score,
            vote_count = outcome.item.vote_count,
            scores_stale,
            "Vote processed"
        );
        Ok(outcome)
    }

    async fn preview(
        &self,
        request: &VoteRequest,
        voter: &Voter,
        definition: &VoteTypeDefinition,
        item: ScoredItem,
        intent: Intent,
    ) -> Result<VoteOutcome, EngineError> {
        let live = self.ledger.find_all_live_votes(item.id, voter.id).await?;
        let Some(mut plan) = self
            .plan(request, voter, definition, &item, intent, &live)
            .await?
        else {
            return Ok(VoteOutcome::unchanged(item, false));
        };
        self.run_hooks(voter, &item, &mut plan).await?;

        let retracted_ids: HashSet<VoteId> = plan.retract.iter().map(|r| r.id).collect();
        let mut projected: Vec<VoteRecord> = self
            .ledger
            .find_live_votes_for_item(item.id)
            .await?
            .into_iter()
            .filter(|r| !retracted_ids.contains(&r.id))
            .collect();
        let cast = plan.cast.take().map(|vote| vote.into_record(Uuid::nil()));
        projected.extend(cast.iter().cloned());

        let scores = recalculate_scores(&item, &projected, self.clock.now(), &self.config.decay);
        debug!(
            transition = plan.transition.as_str(),
            base_score = scores.base_score,
            "Vote previewed"
        );
        Ok(VoteOutcome {
            item: item.with_scores(scores),
            transition: plan.transition,
            cast,
            retracted: plan.retract,
            persisted: false,
            voting_pattern_warning: plan.verdict.warning,
            scores_stale: false,
        })
    }

    /// Plans the transition, runs the hooks and commits the writes in one
    /// ledger transaction.
    ///
    /// Returns `None` when the intent is already fulfilled.
    async fn plan_and_commit(
        &self,
        request: &VoteRequest,
        voter: &Voter,
        definition: &VoteTypeDefinition,
        item: &ScoredItem,
        intent: Intent,
        live: &[VoteRecord],
    ) -> Result<Option<(Plan, LedgerWrite)>, EngineError> {
        let Some(mut plan) = self
            .plan(request, voter, definition, item, intent, live)
            .await?
        else {
            return Ok(None);
        };
        self.run_hooks(voter, item, &mut plan).await?;

        let now = self.clock.now();
        let retractions = plan
            .retract
            .iter()
            .map(|record| Retraction::of(record, now))
            .collect();
        let write = self.commit_with_retry(retractions, plan.cast.take()).await?;
        Ok(write.map(|write| (plan, write)))
    }

    /// Decides the transition from the user's current live votes.
    ///
    /// Returns `None` when the intent is already fulfilled.
    async fn plan(
        &self,
        request: &VoteRequest,
        voter: &Voter,
        definition: &VoteTypeDefinition,
        item: &ScoredItem,
        intent: Intent,
        live: &[VoteRecord],
    ) -> Result<Option<Plan>, EngineError> {
        match intent {
            Intent::Retract(vote_id) => {
                let Some(original) = live.iter().find(|r| r.id == vote_id) else {
                    return Ok(None);
                };
                Ok(Some(Plan {
                    transition: VoteTransition::ToggleOff,
                    retract: vec![original.clone()],
                    cast: None,
                    verdict: RateLimitVerdict::default(),
                }))
            }
            Intent::Cast => {
                if live.iter().any(|r| r.kind == definition.name) {
                    return Ok(None);
                }
                let retract: Vec<VoteRecord> = live
                    .iter()
                    .filter(|r| {
                        self.registry
                            .get(&r.kind)
                            .is_some_and(|other| other.conflicts_with(definition))
                    })
                    .cloned()
                    .collect();

                let verdict = self.check_rate_limits(request, voter, item).await?;
                let power = self.power_policy.resolve_power(voter, definition);
                let cast = NewVote::cast(
                    item.id,
                    item.collection.clone(),
                    voter.id,
                    definition.name.clone(),
                    power,
                    self.clock.now(),
                )
                .with_authors(item.author_ids());

                Ok(Some(Plan {
                    transition: if retract.is_empty() {
                        VoteTransition::Cast
                    } else {
                        VoteTransition::Exchange
                    },
                    retract,
                    cast: Some(cast),
                    verdict,
                }))
            }
        }
    }

    async fn check_rate_limits(
        &self,
        request: &VoteRequest,
        voter: &Voter,
        item: &ScoredItem,
    ) -> Result<RateLimitVerdict, EngineError> {
        if !self.config.rate_limits_enabled
            || request.skip_rate_limits
            || voter.is_admin
            || item.author_id == Some(voter.id)
        {
            return Ok(RateLimitVerdict::default());
        }

        let now = self.clock.now();
        let recent = self
            .ledger
            .find_user_votes_since(voter.id, now - rate_limit::lookback())
            .await?;
        let verdict = self
            .rate_limiter
            .evaluate(voter, item, &recent, &self.registry, now);

        if let Some(message) = &verdict.denied {
            warn!(reason = %message, "Vote denied by rate limit");
            return Err(EngineError::RateLimited(message.clone()));
        }
        if verdict.flag_for_moderation {
            warn!("Voting pattern flagged for moderation");
        }
        Ok(verdict)
    }

    async fn run_hooks(
        &self,
        voter: &Voter,
        item: &ScoredItem,
        plan: &mut Plan,
    ) -> Result<(), EngineError> {
        if self.hooks.is_empty() {
            return Ok(());
        }

        let mut proposal = VoteProposal::new(
            item.clone(),
            voter.clone(),
            plan.transition,
            plan.retract.clone(),
            plan.cast.clone(),
        );
        for hook in &self.hooks {
            proposal = match hook.before_write(proposal).await {
                Ok(proposal) => proposal,
                Err(e) => {
                    warn!(hook = hook.name(), error = %e, "Vote vetoed by hook");
                    return Err(e.into());
                }
            };
        }

        if let (Some(cast), Some(power)) = (plan.cast.as_mut(), proposal.cast_power()) {
            cast.power = power;
        }
        Ok(())
    }

    /// Retracts live votes in one ledger transaction.
    ///
    /// Returns the records this call retracted; votes already cancelled by
    /// someone else are left out.
    async fn retract_all(&self, records: Vec<VoteRecord>) -> Result<Vec<VoteRecord>, EngineError> {
        let now = self.clock.now();
        let retractions = records
            .iter()
            .map(|record| Retraction::of(record, now))
            .collect();
        let write = self.ledger.commit(retractions, None).await?;
        let (retracted, skipped): (Vec<VoteRecord>, Vec<VoteRecord>) = records
            .into_iter()
            .partition(|record| write.retracted.contains(&record.id));
        for record in &skipped {
            debug!(vote_id = %record.id, "Vote already cancelled");
        }
        Ok(retracted)
    }

    /// Commits a transition, retrying with backoff while the store reports a
    /// conflicting live record that is no longer there when re-read.
    ///
    /// A conflicting commit writes nothing, so every attempt starts from the
    /// same ledger state. Returns `None` when a concurrent request already cast
    /// the same vote.
    async fn commit_with_retry(
        &self,
        retractions: Vec<Retraction>,
        cast: Option<NewVote>,
    ) -> Result<Option<LedgerWrite>, EngineError> {
        let mut delays = backoff(self.config.max_conflict_retries);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let error = match self.ledger.commit(retractions.clone(), cast.clone()).await {
                Ok(write) => return Ok(Some(write)),
                Err(e) => e,
            };
            let Some(vote) = cast.as_ref().filter(|_| error.is_conflict()) else {
                return Err(error.into());
            };

            let current = self
                .ledger
                .find_live_vote(vote.item_id, vote.user_id, &vote.kind)
                .await?;
            if current.is_some() {
                debug!("Concurrent request already cast this vote");
                return Ok(None);
            }
            let Some(delay) = delays.next() else {
                return Err(EngineError::ConcurrentConflict {
                    item_id: vote.item_id,
                    user_id: vote.user_id,
                    kind: vote.kind.clone(),
                    attempts,
                });
            };
            warn!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "Live vote conflict, retrying write"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Retracts all but the newest of any live votes sharing an exclusivity slot.
    ///
    /// Returns the surviving live votes and the retracted ones.
    async fn repair_duplicates(
        &self,
        live: Vec<VoteRecord>,
    ) -> Result<(Vec<VoteRecord>, Vec<VoteRecord>), EngineError> {
        let (kept, duplicates) = split_duplicates(&self.registry, live);
        if duplicates.is_empty() {
            return Ok((kept, duplicates));
        }
        for record in &duplicates {
            error!(
                vote_id = %record.id,
                item_id = %record.item_id,
                user_id = %record.user_id,
                kind = %record.kind,
                "Invariant violation: several live votes in one exclusivity group, retracting the older one"
            );
        }
        let retracted = self.retract_all(duplicates).await?;
        Ok((kept, retracted))
    }

    /// Recomputes and stores the item's scores, retrying with backoff.
    ///
    /// On persistent failure the item is queued for `repair_stale_items` and returned
    /// unchanged with the stale flag set.
    async fn refresh_scores(&self, item: ScoredItem) -> (ScoredItem, bool) {
        let strategy = backoff(self.config.recalculation_retries);
        let result = Retry::spawn(strategy, || self.recompute(&item)).await;
        match result {
            Ok(updated) => (updated, false),
            Err(e) => {
                error!(
                    item_id = %item.id,
                    collection = %item.collection,
                    error = %e,
                    "Score recomputation failed, item queued for repair"
                );
                self.queue_stale(&item.collection, item.id);
                (item, true)
            }
        }
    }

    /// Reads the live votes and writes the derived fields. Serialized per item so
    /// the last write always reflects the latest ledger state.
    async fn recompute(&self, item: &ScoredItem) -> Result<ScoredItem, EngineError> {
        let _guard = self.score_locks.acquire(item.id).await;
        self.recompute_locked(item).await
    }

    async fn recompute_locked(&self, item: &ScoredItem) -> Result<ScoredItem, EngineError> {
        let live = self.ledger.find_live_votes_for_item(item.id).await?;
        let scores = recalculate_scores(item, &live, self.clock.now(), &self.config.decay);
        self.items
            .update_scores(&item.collection, item.id, scores)
            .await?;
        Ok(item.with_scores(scores))
    }

    fn publish_events(&self, outcome: &VoteOutcome, flag_for_moderation: bool) {
        let Some(publisher) = &self.events else {
            return;
        };

        let mut events: Vec<VoteEvent> = outcome
            .retracted
            .iter()
            .map(|r| VoteEvent::new(VoteEventKind::Retract, outcome.item.clone(), r.clone()))
            .collect();
        if let Some(cast) = &outcome.cast {
            events.push(VoteEvent::new(
                VoteEventKind::Cast,
                outcome.item.clone(),
                cast.clone(),
            ));
            if flag_for_moderation {
                events.push(VoteEvent::new(
                    VoteEventKind::VotingPatternFlag,
                    outcome.item.clone(),
                    cast.clone(),
                ));
            }
        }
        if events.is_empty() {
            return;
        }

        publisher.publish(DispatchBatch {
            item: outcome.item.clone(),
            events,
        });
    }

    async fn load_item(&self, collection: &str, item_id: ItemId) -> Result<ScoredItem, EngineError> {
        self.items
            .get_item(collection, item_id)
            .await?
            .ok_or_else(|| EngineError::item_not_found(collection, item_id))
    }

    fn queue_stale(&self, collection: &str, item_id: ItemId) {
        self.stale_items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((collection.to_string(), item_id));
    }

    fn unqueue_stale(&self, collection: &str, item_id: ItemId) {
        self.stale_items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(collection.to_string(), item_id));
    }

    fn take_stale(&self) -> Vec<(String, ItemId)> {
        let mut stale = self
            .stale_items
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *stale).into_iter().collect()
    }

    /// Number of (item, user) and item lock entries currently held or awaited.
    pub fn active_locks(&self) -> usize {
        self.locks.active_keys() + self.score_locks.active_keys()
    }

    /// Items whose scores could not be recomputed after a ledger write.
    pub fn stale_items(&self) -> Vec<(String, ItemId)> {
        self.stale_items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

/// Jittered exponential delays between retries, `retries` of them.
fn backoff(retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(10)
        .factor(2)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(retries)
}

/// Splits live votes into those to keep and older duplicates of an exclusivity
/// slot. Among conflicting votes the most recent one is kept.
fn split_duplicates(
    registry: &VoteTypeRegistry,
    mut live: Vec<VoteRecord>,
) -> (Vec<VoteRecord>, Vec<VoteRecord>) {
    live.sort_by(|a, b| b.voted_at.cmp(&a.voted_at));
    let mut kept: Vec<VoteRecord> = Vec::with_capacity(live.len());
    let mut duplicates = Vec::new();
    for record in live {
        let shadowed = kept
            .iter()
            .any(|k| k.user_id == record.user_id && registry.records_conflict(k, &record));
        if shadowed {
            duplicates.push(record);
        } else {
            kept.push(record);
        }
    }
    (kept, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn live_vote(user: UserId, kind: &str, minutes_ago: i64) -> VoteRecord {
        NewVote::cast(
            Uuid::nil(),
            "posts",
            user,
            kind,
            1,
            Utc::now() - ChronoDuration::minutes(minutes_ago),
        )
        .into_record(Uuid::new_v4())
    }

    #[test]
    fn test_split_duplicates_keeps_newest_per_group() {
        let registry = VoteTypeRegistry::with_defaults();
        let user = Uuid::new_v4();
        let newest = live_vote(user, "bigUpvote", 1);
        let older = live_vote(user, "smallUpvote", 5);
        let oldest = live_vote(user, "smallUpvote", 9);

        let (kept, duplicates) =
            split_duplicates(&registry, vec![oldest.clone(), newest.clone(), older.clone()]);

        assert_eq!(kept, vec![newest]);
        assert_eq!(duplicates, vec![older, oldest]);
    }

    #[test]
    fn test_split_duplicates_ignores_other_users_and_groups() {
        let registry = VoteTypeRegistry::with_defaults()
            .register(VoteTypeDefinition::new("agree", 1).in_group("agreement"));
        let user = Uuid::new_v4();
        let votes = vec![
            live_vote(user, "smallUpvote", 1),
            live_vote(user, "agree", 2),
            live_vote(Uuid::new_v4(), "smallUpvote", 3),
        ];

        let (kept, duplicates) = split_duplicates(&registry, votes);
        assert_eq!(kept.len(), 3);
        assert!(duplicates.is_empty());
    }
}
