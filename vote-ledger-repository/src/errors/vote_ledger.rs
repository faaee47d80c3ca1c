//! Error types for the vote ledger.
//! Defines specific errors that can occur while reading or appending ledger entries.
use thiserror::Error;
use uuid::Uuid;

/// Represents errors that can occur within the vote ledger.
///
/// This enum consolidates the storage failures of every ledger backend, plus the
/// conflict raised when an insert would create a second live vote for the same
/// item, user and kind.
#[derive(Debug, Error)]
pub enum VoteLedgerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Live vote already exists: item={item_id}, user={user_id}, kind={kind}")]
    Conflict {
        item_id: Uuid,
        user_id: Uuid,
        kind: String,
    },

    #[error("Vote record not found: {0}")]
    RecordNotFound(Uuid),

    #[error("Invalid vote record: {0}")]
    InvalidRecord(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl VoteLedgerError {
    pub fn conflict(item_id: Uuid, user_id: Uuid, kind: impl Into<String>) -> Self {
        Self::Conflict {
            item_id,
            user_id,
            kind: kind.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
