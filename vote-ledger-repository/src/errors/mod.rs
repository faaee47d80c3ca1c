//! Error types for the vote ledger repository.
//! Consolidates and re-exports error types related to ledger, item and voter storage.
mod items;
mod users;
mod vote_ledger;

pub use items::ItemRepositoryError;
pub use users::UserRepositoryError;
pub use vote_ledger::VoteLedgerError;
