//! Vote Ledger Library
//!
//! Wires the vote engine to PostgreSQL and runs the score recomputation pass the
//! external decay scheduler relies on.

pub mod config;
pub mod errors;
pub mod rescore;

pub use config::Dependencies;
pub use errors::AppError;
pub use rescore::rescore_collections;
