use std::env;
use std::sync::Arc;

use tracing::info;
use vote_ledger_engine::{EngineConfig, VoteEngine};
use vote_ledger_repository::{
    PostgresItemRepository, PostgresUserRepository, PostgresVoteLedger, run_migrations,
};

use crate::errors::AppError;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const VOTES_RESCORE_COLLECTIONS: &str = "VOTES_RESCORE_COLLECTIONS";

const DEFAULT_COLLECTIONS: &str = "posts,comments";

/// `Dependencies` holds the engine and the collections the binary rescores.
pub struct Dependencies {
    pub engine: Arc<VoteEngine>,
    pub collections: Vec<String>,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Connects to PostgreSQL, applies the ledger migrations and builds the
    /// engine from `EngineConfig::from_env`.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or an
    /// `AppError` if the environment is incomplete or the database is unreachable.
    pub async fn new() -> Result<Self, AppError> {
        let database_url = env::var(DATABASE_URL).map_err(|_| AppError::MissingEnv(DATABASE_URL))?;
        let collections = parse_collections(
            &env::var(VOTES_RESCORE_COLLECTIONS).unwrap_or_else(|_| DEFAULT_COLLECTIONS.to_string()),
        );
        let config = EngineConfig::from_env()?;

        let pool = sqlx::PgPool::connect(&database_url).await?;
        run_migrations(&pool).await?;
        info!("Database migrations applied");

        let engine = VoteEngine::new(
            Arc::new(PostgresVoteLedger::new(pool.clone()).await?),
            Arc::new(PostgresItemRepository::new(pool.clone()).await?),
            Arc::new(PostgresUserRepository::new(pool).await?),
            config,
        );

        Ok(Dependencies {
            engine: Arc::new(engine),
            collections,
        })
    }
}

/// Splits a comma-separated collection list, dropping blanks and duplicates.
pub fn parse_collections(raw: &str) -> Vec<String> {
    let mut collections: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !collections.iter().any(|c| c == name) {
            collections.push(name.to_string());
        }
    }
    collections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collections() {
        assert_eq!(
            parse_collections(" posts, comments ,,posts"),
            vec!["posts".to_string(), "comments".to_string()]
        );
        assert!(parse_collections(" , ").is_empty());
        assert_eq!(parse_collections(DEFAULT_COLLECTIONS).len(), 2);
    }
}
