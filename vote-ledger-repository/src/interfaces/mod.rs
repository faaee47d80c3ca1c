//! This module defines and re-exports the interfaces for the vote ledger repository.
//! It serves as a central point for accessing traits related to data interaction.
mod item_repository;
mod user_repository;
mod vote_ledger;

pub use item_repository::ItemRepository;
pub use user_repository::UserRepository;
pub use vote_ledger::{LedgerWrite, Retraction, VoteLedger};
pub(crate) use vote_ledger::check_cast;
