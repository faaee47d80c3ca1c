//! PostgreSQL implementations of the repository traits.
//!
//! The schema lives in `migrations/`. The live-vote constraint is enforced by a
//! partial unique index on `votes (item_id, user_id, kind) WHERE NOT cancelled`,
//! and unique violations surface as `VoteLedgerError::Conflict`.
mod items;
mod users;
mod vote_ledger;

pub use items::PostgresItemRepository;
pub use users::PostgresUserRepository;
pub use vote_ledger::PostgresVoteLedger;

/// Applies the ledger schema to the database behind `pool`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("src/postgres/migrations").run(pool).await
}
