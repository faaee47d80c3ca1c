use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use vote_ledger_shared::types::{ItemId, ItemScores, ScoredItem};

use crate::{ItemRepository, ItemRepositoryError};

/// In-memory store of scored items, keyed by collection and id.
#[derive(Default)]
pub struct InMemoryItemRepository {
    items: RwLock<HashMap<(String, ItemId), ScoredItem>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an item.
    pub fn insert(&self, item: ScoredItem) -> Result<(), ItemRepositoryError> {
        self.items
            .write()
            .map_err(|_| poisoned())?
            .insert((item.collection.clone(), item.id), item);
        Ok(())
    }
}

fn poisoned() -> ItemRepositoryError {
    ItemRepositoryError::Unavailable("item lock poisoned".to_string())
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn get_item(
        &self,
        collection: &str,
        item_id: ItemId,
    ) -> Result<Option<ScoredItem>, ItemRepositoryError> {
        Ok(self
            .items
            .read()
            .map_err(|_| poisoned())?
            .get(&(collection.to_string(), item_id))
            .cloned())
    }

    async fn update_scores(
        &self,
        collection: &str,
        item_id: ItemId,
        scores: ItemScores,
    ) -> Result<(), ItemRepositoryError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let item = items.get_mut(&(collection.to_string(), item_id)).ok_or_else(|| {
            ItemRepositoryError::ItemNotFound {
                collection: collection.to_string(),
                item_id,
            }
        })?;
        *item = item.with_scores(scores);
        Ok(())
    }

    async fn list_item_ids(&self, collection: &str) -> Result<Vec<ItemId>, ItemRepositoryError> {
        let mut ids: Vec<ItemId> = self
            .items
            .read()
            .map_err(|_| poisoned())?
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
