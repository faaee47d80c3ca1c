use thiserror::Error;

/// Errors returned by synchronous vote hooks.
///
/// Any hook error aborts the request before the ledger is written.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{hook} rejected the vote: {reason}")]
    Rejected { hook: String, reason: String },

    #[error("{hook} failed: {reason}")]
    Failed { hook: String, reason: String },
}

impl HookError {
    pub fn rejected(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            hook: hook.into(),
            reason: reason.into(),
        }
    }

    pub fn failed(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            hook: hook.into(),
            reason: reason.into(),
        }
    }
}
