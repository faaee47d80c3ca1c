use vote_ledger_shared::types::{ItemId, UserId};

/// A user's request to vote on an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub item_id: ItemId,
    pub item_collection: String,
    pub user_id: UserId,
    pub kind: String,
    /// `false` computes the outcome without writing anything.
    pub should_persist: bool,
    /// When the user already holds a live vote of this kind, retract it.
    /// When disabled, such a request is a no-op.
    pub toggle_if_already_voted: bool,
    pub skip_rate_limits: bool,
}

impl VoteRequest {
    pub fn new(
        item_collection: impl Into<String>,
        item_id: ItemId,
        user_id: UserId,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            item_collection: item_collection.into(),
            user_id,
            kind: kind.into(),
            should_persist: true,
            toggle_if_already_voted: true,
            skip_rate_limits: false,
        }
    }

    /// Turns the request into a preview.
    pub fn preview(mut self) -> Self {
        self.should_persist = false;
        self
    }

    pub fn without_toggle(mut self) -> Self {
        self.toggle_if_already_voted = false;
        self
    }

    pub fn skipping_rate_limits(mut self) -> Self {
        self.skip_rate_limits = true;
        self
    }
}
