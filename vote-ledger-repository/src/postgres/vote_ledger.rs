//! PostgreSQL implementation of the vote ledger.
//!
//! Records live in the `votes` table. Rows are only ever inserted or flagged as
//! cancelled; nothing is deleted.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use uuid::Uuid;
use vote_ledger_shared::types::{ItemId, NewVote, UserId, VoteId, VoteRecord};

use crate::interfaces::check_cast;
use crate::{LedgerWrite, Retraction, VoteLedger, VoteLedgerError};

const VOTE_COLUMNS: &str = "id, item_id, item_collection, user_id, kind, power, cancelled, is_unvote, voted_at, author_ids";

/// PostgreSQL implementation of the vote ledger.
///
/// ## Features
///
/// - Connection pooling with `sqlx::PgPool`
/// - Live-vote uniqueness backed by a partial unique index
/// - Conditional cancellation with `UPDATE ... WHERE NOT cancelled`
/// - Retractions and casts committed together in one transaction
pub struct PostgresVoteLedger {
    pool: sqlx::PgPool,
}

impl PostgresVoteLedger {
    /// Creates a new PostgreSQL ledger instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the ledger schema applied
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVoteLedger)` - Ready-to-use ledger instance
    /// * `Err(VoteLedgerError)` - Reserved for future validation (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VoteLedgerError> {
        Ok(Self { pool })
    }

    async fn fetch_records(
        &self,
        filter: &str,
        binds: &[Uuid],
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        let sql = format!("SELECT {VOTE_COLUMNS} FROM votes WHERE {filter} ORDER BY voted_at, id");
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        if let Some(since) = since {
            query = query.bind(since);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &PgRow) -> Result<VoteRecord, VoteLedgerError> {
    Ok(VoteRecord {
        id: row.try_get("id")?,
        item_id: row.try_get("item_id")?,
        item_collection: row.try_get("item_collection")?,
        user_id: row.try_get("user_id")?,
        kind: row.try_get("kind")?,
        power: row.try_get("power")?,
        cancelled: row.try_get("cancelled")?,
        is_unvote: row.try_get("is_unvote")?,
        voted_at: row.try_get("voted_at")?,
        author_ids: row.try_get("author_ids")?,
    })
}

async fn insert_record(
    conn: &mut PgConnection,
    record: VoteRecord,
) -> Result<VoteRecord, VoteLedgerError> {
    let result = sqlx::query(
        r#"
        INSERT INTO votes (id, item_id, item_collection, user_id, kind, power, cancelled, is_unvote, voted_at, author_ids)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(record.id)
    .bind(record.item_id)
    .bind(&record.item_collection)
    .bind(record.user_id)
    .bind(&record.kind)
    .bind(record.power)
    .bind(record.cancelled)
    .bind(record.is_unvote)
    .bind(record.voted_at)
    .bind(&record.author_ids)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(record),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            tracing::debug!(
                item_id = %record.item_id,
                user_id = %record.user_id,
                kind = %record.kind,
                "Live vote already exists"
            );
            Err(VoteLedgerError::conflict(record.item_id, record.user_id, record.kind))
        }
        Err(e) => Err(VoteLedgerError::DatabaseError(e)),
    }
}

/// Cancels the retracted record if it is still live.
///
/// Returns `false` when the record was already cancelled. The row is locked for
/// the rest of the transaction once updated.
async fn cancel_record(
    conn: &mut PgConnection,
    retraction: &Retraction,
) -> Result<bool, VoteLedgerError> {
    let sql = format!(
        "UPDATE votes SET cancelled = TRUE WHERE id = $1 AND NOT cancelled RETURNING {VOTE_COLUMNS}"
    );
    let updated = sqlx::query(&sql)
        .bind(retraction.record_id)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(row) = updated {
        retraction.check(&record_from_row(&row)?)?;
        return Ok(true);
    }

    ensure_exists(conn, retraction.record_id).await?;
    Ok(false)
}

async fn ensure_exists(conn: &mut PgConnection, record_id: VoteId) -> Result<(), VoteLedgerError> {
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM votes WHERE id = $1")
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await?;
    match exists {
        Some(_) => Ok(()),
        None => Err(VoteLedgerError::RecordNotFound(record_id)),
    }
}

#[async_trait]
impl VoteLedger for PostgresVoteLedger {
    async fn find_live_vote(
        &self,
        item_id: ItemId,
        user_id: UserId,
        kind: &str,
    ) -> Result<Option<VoteRecord>, VoteLedgerError> {
        let sql = format!(
            "SELECT {VOTE_COLUMNS} FROM votes
             WHERE item_id = $1 AND user_id = $2 AND kind = $3 AND NOT cancelled AND NOT is_unvote
             LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(item_id)
            .bind(user_id)
            .bind(kind)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_all_live_votes(
        &self,
        item_id: ItemId,
        user_id: UserId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.fetch_records(
            "item_id = $1 AND user_id = $2 AND NOT cancelled AND NOT is_unvote",
            &[item_id, user_id],
            None,
        )
        .await
    }

    /// Inserts a record, mapping a unique violation on the live-vote index to
    /// `VoteLedgerError::Conflict`.
    async fn insert(&self, vote: NewVote) -> Result<VoteRecord, VoteLedgerError> {
        let mut conn = self.pool.acquire().await?;
        insert_record(&mut *conn, vote.into_record(Uuid::new_v4())).await
    }

    async fn mark_cancelled(&self, record_id: VoteId) -> Result<bool, VoteLedgerError> {
        let updated = sqlx::query("UPDATE votes SET cancelled = TRUE WHERE id = $1 AND NOT cancelled")
            .bind(record_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated > 0 {
            return Ok(true);
        }
        let mut conn = self.pool.acquire().await?;
        ensure_exists(&mut *conn, record_id).await?;
        Ok(false)
    }

    /// Applies every retraction and the cast inside one transaction.
    ///
    /// Any error drops the transaction before commit, which rolls it back.
    async fn commit(
        &self,
        retractions: Vec<Retraction>,
        cast: Option<NewVote>,
    ) -> Result<LedgerWrite, VoteLedgerError> {
        if let Some(vote) = &cast {
            check_cast(vote)?;
        }

        let mut tx = self.pool.begin().await?;
        let mut write = LedgerWrite::default();
        for retraction in retractions {
            if cancel_record(&mut *tx, &retraction).await? {
                write.retracted.push(retraction.record_id);
                insert_record(&mut *tx, retraction.unvote.into_record(Uuid::new_v4())).await?;
            }
        }
        if let Some(vote) = cast {
            write.cast = Some(insert_record(&mut *tx, vote.into_record(Uuid::new_v4())).await?);
        }
        tx.commit().await?;
        Ok(write)
    }

    async fn find_live_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.fetch_records("item_id = $1 AND NOT cancelled AND NOT is_unvote", &[item_id], None)
            .await
    }

    async fn find_votes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.fetch_records("item_id = $1", &[item_id], None).await
    }

    async fn find_user_votes_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<VoteRecord>, VoteLedgerError> {
        self.fetch_records(
            "user_id = $1 AND NOT cancelled AND NOT is_unvote AND voted_at > $2",
            &[user_id],
            Some(since),
        )
        .await
    }
}
