use thiserror::Error;

/// Errors reported by the asynchronous collaborators.
///
/// These never reach the caller of a vote; the dispatcher logs them.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Search index error: {0}")]
    SearchIndex(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl CollaboratorError {
    pub fn search_index(msg: impl Into<String>) -> Self {
        Self::SearchIndex(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }
}
