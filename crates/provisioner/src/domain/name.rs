#![forbid(unsafe_code)]

use crate::error::Error;
use std::{fmt, str::FromStr};

/// Stable `namespace:collection` identity of a collection.
///
/// Doubles as the fully qualified table name in the target cluster.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName {
    namespace: String,
    collection: String,
}

impl CanonicalName {
    pub fn new(namespace: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            collection: collection.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl FromStr for CanonicalName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, collection))
                if !namespace.is_empty() && !collection.is_empty() && !collection.contains(':') =>
            {
                Ok(Self::new(namespace, collection))
            }
            _ => Err(Error::InvalidName(s.to_owned())),
        }
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.collection)
    }
}

impl fmt::Debug for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CanonicalName")
            .field(&format_args!("{self}"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let name: CanonicalName = "agent_core:agentToDo".parse().unwrap();
        assert_eq!(name.namespace(), "agent_core");
        assert_eq!(name.collection(), "agentToDo");
        assert_eq!(name.to_string(), "agent_core:agentToDo");
    }

    #[test]
    fn rejects_malformed() {
        for raw in ["", "nocolon", ":coll", "ns:", "a:b:c"] {
            assert!(raw.parse::<CanonicalName>().is_err(), "{raw:?}");
        }
    }
}
