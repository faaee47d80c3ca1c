use uuid::Uuid;

/// Identifier of a voted-on item (post, comment, ...).
pub type ItemId = Uuid;

/// Identifier of a voter.
pub type UserId = Uuid;

/// Identifier of a ledger entry.
pub type VoteId = Uuid;
