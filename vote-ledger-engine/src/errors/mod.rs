mod collaborator;
mod config;
mod engine;
mod hook;

pub use collaborator::CollaboratorError;
pub use config::ConfigError;
pub use engine::EngineError;
pub use hook::HookError;
