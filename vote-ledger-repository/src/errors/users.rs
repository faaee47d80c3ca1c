use thiserror::Error;

#[derive(Debug, Error)]
/// Represents errors that can occur while loading voters.
pub enum UserRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("User repository unavailable: {0}")]
    Unavailable(String),
}
