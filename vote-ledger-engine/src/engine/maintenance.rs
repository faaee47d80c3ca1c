//! Bulk recomputation, repair of stale items and ledger audits.
use std::collections::HashMap;

use tracing::{info, instrument, warn};
use vote_ledger_shared::types::{ItemId, ScoredItem, UserId, VoteRecord};

use super::{VoteEngine, split_duplicates};
use crate::errors::EngineError;
use crate::scoring::{compute_base_score, compute_ledger_sum, compute_vote_count};

/// Summary of a bulk recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecalculationReport {
    pub recalculated: usize,
    pub failed: Vec<ItemId>,
}

impl RecalculationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Consistency check of one item's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAudit {
    pub item_id: ItemId,
    /// Sum of power over every record, cancelled votes and unvotes included.
    pub ledger_sum: i64,
    /// Sum of power over live votes only.
    pub base_score: i64,
    pub live_votes: i64,
    /// Live votes shadowed by a newer live vote in the same exclusivity group.
    pub duplicate_live_votes: usize,
}

impl LedgerAudit {
    /// Whether replaying the full ledger yields the live score.
    pub fn replay_agrees(&self) -> bool {
        self.ledger_sum == self.base_score
    }

    pub fn is_consistent(&self) -> bool {
        self.replay_agrees() && self.duplicate_live_votes == 0
    }
}

impl VoteEngine {
    /// Recomputes one item's scores from its live votes and stores them.
    #[instrument(skip(self))]
    pub async fn recalculate_item(
        &self,
        collection: &str,
        item_id: ItemId,
    ) -> Result<ScoredItem, EngineError> {
        let item = self.load_item(collection, item_id).await?;
        let updated = self.recompute(&item).await?;
        self.unqueue_stale(collection, item_id);
        Ok(updated)
    }

    /// Recomputes every item of a collection.
    ///
    /// Per-item failures are collected in the report rather than aborting the run.
    ///
    /// # Returns
    ///
    /// * `Ok(RecalculationReport)` - Items recomputed and items that failed
    /// * `Err(EngineError)` - The collection's items could not be listed
    #[instrument(skip(self))]
    pub async fn recalculate_collection(
        &self,
        collection: &str,
    ) -> Result<RecalculationReport, EngineError> {
        let item_ids = self.items.list_item_ids(collection).await?;
        let mut report = RecalculationReport::default();

        for item_id in item_ids {
            match self.recalculate_item(collection, item_id).await {
                Ok(_) => report.recalculated += 1,
                Err(e) => {
                    warn!(item_id = %item_id, error = %e, "Failed to recalculate item");
                    report.failed.push(item_id);
                }
            }
        }

        info!(
            recalculated = report.recalculated,
            failed = report.failed.len(),
            "Collection recalculated"
        );
        Ok(report)
    }

    /// Retries the recomputation of every item queued after a failed post-write
    /// update. Items that fail again stay queued; items that no longer exist are
    /// dropped.
    #[instrument(skip(self))]
    pub async fn repair_stale_items(&self) -> RecalculationReport {
        let mut report = RecalculationReport::default();

        for (collection, item_id) in self.take_stale() {
            match self.recalculate_item(&collection, item_id).await {
                Ok(_) => report.recalculated += 1,
                Err(e) if e.is_not_found() => {
                    warn!(item_id = %item_id, "Stale item no longer exists, dropping");
                }
                Err(e) => {
                    warn!(item_id = %item_id, error = %e, "Stale item still failing");
                    self.queue_stale(&collection, item_id);
                    report.failed.push(item_id);
                }
            }
        }

        if report.recalculated > 0 || !report.failed.is_empty() {
            info!(
                repaired = report.recalculated,
                still_stale = report.failed.len(),
                "Stale items processed"
            );
        }
        report
    }

    /// Replays an item's full ledger and compares it with its live votes.
    #[instrument(skip(self))]
    pub async fn verify_ledger(&self, item_id: ItemId) -> Result<LedgerAudit, EngineError> {
        let records = self.ledger.find_votes_for_item(item_id).await?;
        let live: Vec<VoteRecord> = records.iter().filter(|r| r.is_live()).cloned().collect();

        let mut by_user: HashMap<UserId, Vec<VoteRecord>> = HashMap::new();
        for record in &live {
            by_user.entry(record.user_id).or_default().push(record.clone());
        }
        let duplicate_live_votes = by_user
            .into_values()
            .map(|votes| split_duplicates(&self.registry, votes).1.len())
            .sum();

        let audit = LedgerAudit {
            item_id,
            ledger_sum: compute_ledger_sum(&records),
            base_score: compute_base_score(&live),
            live_votes: compute_vote_count(&live),
            duplicate_live_votes,
        };
        if !audit.is_consistent() {
            warn!(
                ledger_sum = audit.ledger_sum,
                base_score = audit.base_score,
                duplicates = audit.duplicate_live_votes,
                "Ledger audit found inconsistencies"
            );
        }
        Ok(audit)
    }
}
