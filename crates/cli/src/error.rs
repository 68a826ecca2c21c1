#![forbid(unsafe_code)]

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] io::Error),

    #[error("Invalid object store url `{url}`: {source}")]
    StoreUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to open object store: {0}")]
    Store(#[from] object_store::Error),

    #[error("Provisioning interrupted by {0}")]
    Interrupted(crate::signals::Shutdown),
}
