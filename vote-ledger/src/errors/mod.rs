//! Error types for the vote ledger binary.
//! Consolidates configuration, database, repository and engine failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("Configuration error: {0}")]
    Config(#[from] vote_ledger_engine::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] vote_ledger_repository::VoteLedgerError),
    #[error("Item repository error: {0}")]
    Items(#[from] vote_ledger_repository::ItemRepositoryError),
    #[error("User repository error: {0}")]
    Users(#[from] vote_ledger_repository::UserRepositoryError),
    #[error("Engine error: {0}")]
    Engine(#[from] vote_ledger_engine::EngineError),
    #[error("Tracing initialization failed: {0}")]
    Tracing(String),
}
