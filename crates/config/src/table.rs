#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Settings applied to every created table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Table {
    pub column_family: String,
    pub region_replication: u32,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            column_family: "cf".into(),
            region_replication: 1,
        }
    }
}
