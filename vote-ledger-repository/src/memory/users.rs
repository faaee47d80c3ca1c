use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use vote_ledger_shared::types::{UserId, Voter};

use crate::{UserRepository, UserRepositoryError};

/// In-memory store of voters.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, Voter>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, voter: Voter) -> Result<(), UserRepositoryError> {
        self.users
            .write()
            .map_err(|_| UserRepositoryError::Unavailable("user lock poisoned".to_string()))?
            .insert(voter.id, voter);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, user_id: UserId) -> Result<Option<Voter>, UserRepositoryError> {
        Ok(self
            .users
            .read()
            .map_err(|_| UserRepositoryError::Unavailable("user lock poisoned".to_string()))?
            .get(&user_id)
            .cloned())
    }
}
