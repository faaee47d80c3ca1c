use async_trait::async_trait;
use sqlx::Row;
use vote_ledger_shared::types::{ItemId, ItemScores, ScoredItem};

use crate::{ItemRepository, ItemRepositoryError};

/// PostgreSQL implementation of the item repository, backed by `scored_items`.
pub struct PostgresItemRepository {
    pool: sqlx::PgPool,
}

impl PostgresItemRepository {
    /// Creates a new PostgreSQL item repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresItemRepository)` - Ready-to-use repository instance
    /// * `Err(ItemRepositoryError)` - Reserved for future validation (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, ItemRepositoryError> {
        Ok(Self { pool })
    }

    /// Inserts an item or replaces its stored fields.
    pub async fn save_item(&self, item: &ScoredItem) -> Result<(), ItemRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO scored_items (collection, id, author_id, posted_at, base_score, score, vote_count, inactive)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (collection, id)
            DO UPDATE SET
                author_id = EXCLUDED.author_id,
                posted_at = EXCLUDED.posted_at,
                base_score = EXCLUDED.base_score,
                score = EXCLUDED.score,
                vote_count = EXCLUDED.vote_count,
                inactive = EXCLUDED.inactive
            "#,
        )
        .bind(&item.collection)
        .bind(item.id)
        .bind(item.author_id)
        .bind(item.posted_at)
        .bind(item.base_score)
        .bind(item.score)
        .bind(item.vote_count)
        .bind(item.inactive)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn get_item(
        &self,
        collection: &str,
        item_id: ItemId,
    ) -> Result<Option<ScoredItem>, ItemRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT collection, id, author_id, posted_at, base_score, score, vote_count, inactive
            FROM scored_items
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(ScoredItem {
            id: row.try_get("id")?,
            collection: row.try_get("collection")?,
            author_id: row.try_get("author_id")?,
            posted_at: row.try_get("posted_at")?,
            base_score: row.try_get("base_score")?,
            score: row.try_get("score")?,
            vote_count: row.try_get("vote_count")?,
            inactive: row.try_get("inactive")?,
        }))
    }

    async fn update_scores(
        &self,
        collection: &str,
        item_id: ItemId,
        scores: ItemScores,
    ) -> Result<(), ItemRepositoryError> {
        let updated = sqlx::query(
            r#"
            UPDATE scored_items
            SET base_score = $3, score = $4, vote_count = $5, inactive = FALSE
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(item_id)
        .bind(scores.base_score)
        .bind(scores.score)
        .bind(scores.vote_count)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ItemRepositoryError::ItemNotFound {
                collection: collection.to_string(),
                item_id,
            });
        }
        Ok(())
    }

    async fn list_item_ids(&self, collection: &str) -> Result<Vec<ItemId>, ItemRepositoryError> {
        let ids = sqlx::query_scalar("SELECT id FROM scored_items WHERE collection = $1 ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
