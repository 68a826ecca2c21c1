#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scheduler {
    /// Collections dispatched per batch.
    pub chunk_size: usize,

    /// Tables with more split keys than this are created one at a time.
    pub large_table_threshold: usize,

    /// How long to wait for a table to become available, in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub creation_timeout: Duration,

    /// Delay between availability checks, in milliseconds.
    #[serde_as(as = "serde_with::DurationMilliSeconds")]
    pub poll_interval: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            chunk_size: 8,
            large_table_threshold: 32,
            creation_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_millis(1000),
        }
    }
}
