#![forbid(unsafe_code)]

use crate::cluster::AdminError;
use crate::inventory::ListError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("pattern `{pattern}` lacks the named group `{group}`")]
    MissingGroup { pattern: String, group: &'static str },

    #[error("invalid alias {from} -> {to}: {reason}")]
    InvalidAlias {
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("invalid canonical name: {0:?}")]
    InvalidName(String),

    #[error("listing `{prefix}` failed after {attempts} attempts: {source}")]
    ListingExhausted {
        prefix: String,
        attempts: u32,
        #[source]
        source: ListError,
    },

    #[error("listing `{prefix}` failed: {source}")]
    Listing {
        prefix: String,
        #[source]
        source: ListError,
    },

    #[error("no collections found to provision")]
    EmptyInventory,

    #[error("capacity leaves no regions for tables")]
    NoRegions,

    #[error("cluster unavailable: {0}")]
    Cluster(#[from] AdminError),

    #[error("failed to join provisioning task: {0}")]
    Join(#[from] tokio::task::JoinError),
}
