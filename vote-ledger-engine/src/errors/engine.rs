//! Error types for the vote engine.
//! Defines the failures a vote request or a recalculation can surface to callers.
use thiserror::Error;
use vote_ledger_repository::{ItemRepositoryError, UserRepositoryError, VoteLedgerError};
use vote_ledger_shared::types::{ItemId, UserId};

use crate::errors::HookError;

/// Represents errors that can occur within the vote engine.
///
/// Request validation failures (`PermissionDenied`, the not-found family,
/// `RateLimited`, `HookRejected`) are always raised before anything is written
/// to the ledger. `ConcurrentConflict` is transient and the request may be retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Permission denied: user {user_id} can't perform {action}")]
    PermissionDenied { user_id: UserId, action: String },

    #[error("Item not found: collection={collection}, id={item_id}")]
    ItemNotFound { collection: String, item_id: ItemId },

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Unknown vote kind: {0}")]
    UnknownVoteKind(String),

    #[error("Concurrent conflict on item={item_id}, user={user_id}, kind={kind} after {attempts} attempts")]
    ConcurrentConflict {
        item_id: ItemId,
        user_id: UserId,
        kind: String,
        attempts: usize,
    },

    #[error("Voting rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Hook rejected the vote: {0}")]
    HookRejected(#[from] HookError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] VoteLedgerError),

    #[error("Item repository error: {0}")]
    Items(#[from] ItemRepositoryError),

    #[error("User repository error: {0}")]
    Users(#[from] UserRepositoryError),
}

impl EngineError {
    /// Create a permission error for a user and an action name.
    pub fn permission_denied(user_id: UserId, action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            user_id,
            action: action.into(),
        }
    }

    /// Create an item-not-found error.
    pub fn item_not_found(collection: impl Into<String>, item_id: ItemId) -> Self {
        Self::ItemNotFound {
            collection: collection.into(),
            item_id,
        }
    }

    /// Returns true when retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConcurrentConflict { .. } => true,
            Self::Ledger(e) => e.is_conflict(),
            _ => false,
        }
    }

    /// Returns true for the not-found family (item, user, vote kind).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound { .. } | Self::UserNotFound(_) | Self::UnknownVoteKind(_)
        )
    }
}
