//! Configuration module for the vote ledger binary.
//! Reads the environment and wires the Postgres-backed engine.
mod dependencies;

pub use dependencies::{DATABASE_URL, Dependencies, VOTES_RESCORE_COLLECTIONS, parse_collections};
