mod ids;
mod outcome;
mod scored_item;
mod vote_event;
mod vote_record;
mod vote_type;
mod voter;

pub use ids::{ItemId, UserId, VoteId};
pub use outcome::{VoteOutcome, VoteTransition};
pub use scored_item::{ItemScores, ScoredItem};
pub use vote_event::{VoteEvent, VoteEventKind, VotePayload};
pub use vote_record::{NewVote, VoteRecord};
pub use vote_type::{PowerScaling, VoteTypeDefinition};
pub use voter::Voter;
