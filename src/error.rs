use thiserror::Error;

/// Failure inside a cache store. Never escapes [`crate::cache::CollectionCache`],
/// which logs it and carries on as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(String),
}

/// Why fetching a collection from the remote catalog failed.
///
/// The fetch itself lives outside this crate; this is the shared
/// classification callers hand back through [`crate::cache::CollectionCache::read_through`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("user not found")]
    NotFound,
    #[error("collection is private")]
    Private,
    #[error("rate limited")]
    RateLimited,
    #[error("upstream error {status}: {message}")]
    Failed { status: u16, message: String },
}

impl UpstreamError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            404 => UpstreamError::NotFound,
            403 => UpstreamError::Private,
            429 => UpstreamError::RateLimited,
            _ => UpstreamError::Failed {
                status,
                message: message.into(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::NotFound => 404,
            UpstreamError::Private => 403,
            UpstreamError::RateLimited => 429,
            UpstreamError::Failed { status, .. } => *status,
        }
    }

    /// Rate limits and server-side faults are worth another attempt later.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::RateLimited => true,
            UpstreamError::Failed { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
