use vote_ledger_shared::types::{ItemId, ItemScores, ScoredItem};

use crate::errors::ItemRepositoryError;

/// Trait for interacting with the collections that own voted-on items.
///
/// The vote engine never creates or deletes items. It reads them and rewrites their
/// derived score fields in a single update.
#[async_trait::async_trait]
pub trait ItemRepository: Send + Sync {
    async fn get_item(
        &self,
        collection: &str,
        item_id: ItemId,
    ) -> Result<Option<ScoredItem>, ItemRepositoryError>;

    /// Writes `base_score`, `score` and `vote_count` in one update and clears the
    /// item's `inactive` flag.
    async fn update_scores(
        &self,
        collection: &str,
        item_id: ItemId,
        scores: ItemScores,
    ) -> Result<(), ItemRepositoryError>;

    async fn list_item_ids(&self, collection: &str) -> Result<Vec<ItemId>, ItemRepositoryError>;
}
