use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The user casting a vote, as far as the vote engine is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voter {
    pub id: UserId,
    pub karma: i64,
    pub is_admin: bool,
}

impl Voter {
    pub fn new(id: UserId, karma: i64) -> Self {
        Self {
            id,
            karma,
            is_admin: false,
        }
    }

    pub fn admin(id: UserId) -> Self {
        Self {
            id,
            karma: 0,
            is_admin: true,
        }
    }
}
