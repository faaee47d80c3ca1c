use async_trait::async_trait;
use sqlx::Row;
use vote_ledger_shared::types::{UserId, Voter};

use crate::{UserRepository, UserRepositoryError};

/// PostgreSQL implementation of the user repository, backed by `voters`.
pub struct PostgresUserRepository {
    pool: sqlx::PgPool,
}

impl PostgresUserRepository {
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, UserRepositoryError> {
        Ok(Self { pool })
    }

    /// Inserts a voter or replaces its karma and admin flag.
    pub async fn save_user(&self, voter: &Voter) -> Result<(), UserRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO voters (id, karma, is_admin)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET karma = EXCLUDED.karma, is_admin = EXCLUDED.is_admin
            "#,
        )
        .bind(voter.id)
        .bind(voter.karma)
        .bind(voter.is_admin)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_user(&self, user_id: UserId) -> Result<Option<Voter>, UserRepositoryError> {
        let row = sqlx::query("SELECT id, karma, is_admin FROM voters WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<Voter, UserRepositoryError> {
            Ok(Voter {
                id: row.try_get("id")?,
                karma: row.try_get("karma")?,
                is_admin: row.try_get("is_admin")?,
            })
        })
        .transpose()
    }
}
