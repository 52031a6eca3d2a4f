use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

// Every fault a hook chain can surface to the dispatch layer
#[derive(Debug, Error)]
pub enum HookError {
    // Invalid combinator or hook arguments, raised at construction time
    #[error("usage error: {0}")]
    Usage(String),

    // A predicate failed while deciding a branch
    #[error("predicate error: {0}")]
    Predicate(String),

    // A leaf step failed
    #[error("step error: {0}")]
    Step(String),

    // The item addressed by the operation is missing or soft deleted
    #[error("not found: {0}")]
    NotFound(String),

    // The receiver service rejected a call
    #[error("service error: {0}")]
    Service(String),

    // A dotted path could not be written
    #[error("invalid path `{path}`: {reason}")]
    Path { path: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HookError {
    pub fn usage(msg: impl Into<String>) -> Self {
        HookError::Usage(msg.into())
    }

    pub fn predicate(msg: impl Into<String>) -> Self {
        HookError::Predicate(msg.into())
    }

    pub fn step(msg: impl Into<String>) -> Self {
        HookError::Step(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        HookError::NotFound(msg.into())
    }
}

// Type alias for results that use `HookError` as the error type
pub type Result<T> = std::result::Result<T, HookError>;
