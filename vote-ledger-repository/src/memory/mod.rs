//! Thread-safe in-memory implementations of the repository traits.
//!
//! They honour the same contracts as the PostgreSQL backend, including the
//! one-live-vote-per-kind constraint, and are used for previews and tests.
mod items;
mod users;
mod vote_ledger;

pub use items::InMemoryItemRepository;
pub use users::InMemoryUserRepository;
pub use vote_ledger::InMemoryVoteLedger;
