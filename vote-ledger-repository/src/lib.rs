//! # Vote Ledger Repository
//! This crate provides traits and implementations for interacting with the
//! vote ledger, the scored items and the voters. It includes definitions for
//! errors, interfaces, a thread-safe in-memory implementation and a concrete
//! implementation for PostgreSQL.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::{ItemRepositoryError, UserRepositoryError, VoteLedgerError};
pub use interfaces::{ItemRepository, LedgerWrite, Retraction, UserRepository, VoteLedger};
pub use memory::{InMemoryItemRepository, InMemoryUserRepository, InMemoryVoteLedger};
pub use postgres::{
    PostgresItemRepository, PostgresUserRepository, PostgresVoteLedger, run_migrations,
};
