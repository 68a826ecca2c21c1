#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Naming {
    /// Must define the named groups `database` and `collection`.
    pub name_pattern: String,

    /// Extra `namespace:collection` aliases, applied on top of the built-in ones.
    pub aliases: BTreeMap<String, String>,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            name_pattern: r"(?P<database>[\w-]+)\.(?P<collection>[\w-]+)".into(),
            aliases: BTreeMap::new(),
        }
    }
}
