//! Interfaces of the services the engine talks to but does not own.
//!
//! The permission checker is consulted synchronously before any ledger read. The
//! search indexer and the notifier are only ever called from the
//! `VoteEventDispatcher`, after the vote has been written.
use std::collections::HashSet;

use vote_ledger_shared::types::{ScoredItem, VotePayload, Voter};

use crate::errors::CollaboratorError;

/// Decides whether a voter may perform an action such as `posts.smallUpvote`.
pub trait PermissionChecker: Send + Sync {
    fn can_perform_action(&self, voter: &Voter, action: &str) -> bool;
}

/// Builds the action name checked for a vote: the lower-cased collection and the kind.
pub fn vote_action(collection: &str, kind: &str) -> String {
    format!("{}.{}", collection.to_lowercase(), kind)
}

/// Grants every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionChecker for AllowAll {
    fn can_perform_action(&self, _voter: &Voter, _action: &str) -> bool {
        true
    }
}

/// Grants the listed actions to everyone, and every action to admins.
#[derive(Debug, Clone, Default)]
pub struct ActionAllowList {
    actions: HashSet<String>,
}

impl ActionAllowList {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

impl PermissionChecker for ActionAllowList {
    fn can_perform_action(&self, voter: &Voter, action: &str) -> bool {
        voter.is_admin || self.actions.contains(action)
    }
}

/// Keeps the full-text search index in sync with item scores.
#[async_trait::async_trait]
pub trait SearchIndexer: Send + Sync {
    /// Re-reads and re-indexes one item.
    ///
    /// # Arguments
    ///
    /// * `item` - The item as it stands after the vote
    ///
    /// # Returns
    ///
    /// `Ok(())` once the resync was accepted, or a `CollaboratorError`.
    async fn resync_document(&self, item: &ScoredItem) -> Result<(), CollaboratorError>;
}

/// Delivers named events to the notification system.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Emits one event.
    ///
    /// # Arguments
    ///
    /// * `event_name` - e.g. `votes.cast.async`
    /// * `payload` - The item, the vote and the voter id
    async fn emit(&self, event_name: &str, payload: &VotePayload) -> Result<(), CollaboratorError>;
}
