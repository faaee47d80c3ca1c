use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
/// Represents errors that can occur within the item repository.
///
/// This enum consolidates various error conditions specific to reading items and
/// rewriting their derived score fields.
pub enum ItemRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Item not found: collection={collection}, id={item_id}")]
    ItemNotFound { collection: String, item_id: Uuid },

    #[error("Item repository unavailable: {0}")]
    Unavailable(String),
}
