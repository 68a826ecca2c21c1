#![forbid(unsafe_code)]

use async_trait::async_trait;

/// One object returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

impl ObjectSummary {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub prefix: String,
    pub continuation_token: Option<String>,
    pub max_keys: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    pub next_token: Option<String>,
    pub is_truncated: bool,
}

impl ListPage {
    /// Token for the following page, if there is one.
    pub fn continuation(&self) -> Option<&str> {
        if self.is_truncated {
            self.next_token.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ListError {
    /// Worth retrying: throttling, timeouts, dropped connections.
    #[error("transient listing failure: {0}")]
    Transient(String),

    /// Retrying cannot help: missing bucket, bad credentials, bad prefix.
    #[error("listing failure: {0}")]
    Permanent(String),
}

impl ListError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Paginated listing of a bucket.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Fetch one page of objects under `request.prefix`.
    async fn list(&self, request: &ListRequest) -> Result<ListPage, ListError>;
}
