use vote_ledger_shared::types::{UserId, Voter};

use crate::errors::UserRepositoryError;

/// Trait for loading the voters known to the application.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: UserId) -> Result<Option<Voter>, UserRepositoryError>;
}
