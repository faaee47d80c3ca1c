//! # Vote Ledger Engine
//! This crate implements the voting state machine on top of the ledger and item
//! stores.
//! It includes the vote type registry, the score functions, power and rate-limit
//! policies, per-voter locking, synchronous hooks and the asynchronous event
//! dispatcher that feeds the search index and notification collaborators.
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod hooks;
pub mod locks;
pub mod power;
pub mod rate_limit;
pub mod registry;
pub mod scoring;

pub mod errors;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{ActionAllowList, AllowAll, Notifier, PermissionChecker, SearchIndexer};
pub use config::EngineConfig;
pub use dispatcher::{DispatchBatch, EventPublisher, VoteEventDispatcher};
pub use engine::{LedgerAudit, RecalculationReport, VoteEngine, VoteRequest};
pub use errors::{CollaboratorError, ConfigError, EngineError, HookError};
pub use hooks::{VoteHook, VoteProposal};
pub use locks::{KeyedLockGuard, KeyedLocks, VoteLocks};
pub use power::{BasePowerPolicy, KarmaPowerPolicy, PowerPolicy};
pub use rate_limit::{RateLimitVerdict, RateLimiter};
pub use registry::VoteTypeRegistry;
pub use scoring::DecayPolicy;
