//! One recomputation pass over the configured collections.
use tracing::{info, warn};
use vote_ledger_engine::{RecalculationReport, VoteEngine};

use crate::errors::AppError;

/// Recomputes every item of every collection.
///
/// Items that fail are reported and skipped; only a failure to list a
/// collection aborts the pass.
///
/// # Returns
///
/// One report per collection, in the order given.
pub async fn rescore_collections(
    engine: &VoteEngine,
    collections: &[String],
) -> Result<Vec<(String, RecalculationReport)>, AppError> {
    let mut reports = Vec::with_capacity(collections.len());

    for collection in collections {
        let report = engine.recalculate_collection(collection).await?;
        if report.is_complete() {
            info!(
                collection = %collection,
                recalculated = report.recalculated,
                "Collection rescored"
            );
        } else {
            warn!(
                collection = %collection,
                recalculated = report.recalculated,
                failed = report.failed.len(),
                "Collection rescored with failures"
            );
        }
        reports.push((collection.clone(), report));
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use uuid::Uuid;
    use vote_ledger_engine::{EngineConfig, VoteRequest};
    use vote_ledger_repository::{
        InMemoryItemRepository, InMemoryUserRepository, InMemoryVoteLedger, ItemRepository,
    };
    use vote_ledger_shared::types::{ScoredItem, Voter};

    #[tokio::test]
    async fn test_rescores_each_collection() {
        let items = Arc::new(InMemoryItemRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let engine = VoteEngine::new(
            Arc::new(InMemoryVoteLedger::new()),
            items.clone(),
            users.clone(),
            EngineConfig::default().without_rate_limits(),
        );

        let voter = Voter::new(Uuid::new_v4(), 0);
        users.insert(voter.clone()).unwrap();
        let posted_at = Utc::now() - Duration::hours(30);
        let post = ScoredItem::new(Uuid::new_v4(), "posts", None, posted_at);
        let comment = ScoredItem::new(Uuid::new_v4(), "comments", None, posted_at);
        items.insert(post.clone()).unwrap();
        items.insert(comment).unwrap();

        let voted = engine
            .perform_vote(VoteRequest::new("posts", post.id, voter.id, "smallUpvote"))
            .await
            .unwrap();

        let reports = rescore_collections(
            &engine,
            &["posts".to_string(), "comments".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, "posts");
        assert_eq!(reports[0].1.recalculated, 1);
        assert_eq!(reports[1].1.recalculated, 1);

        let rescored = items.get_item("posts", post.id).await.unwrap().unwrap();
        assert_eq!(rescored.base_score, 1);
        assert!(rescored.score <= voted.item.score);
    }
}
