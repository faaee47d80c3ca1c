//! # Vote Ledger Shared
//! This crate defines shared data structures and types used across the vote ledger ecosystem.
//! It includes common definitions for vote records, vote types, scored items, voters,
//! transition outcomes and the events emitted after a vote is persisted.
pub mod types;
