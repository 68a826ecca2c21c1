#![forbid(unsafe_code)]

//! Canonical collection names.
//!
//! Exports of one logical collection show up under several raw names: dashed
//! database names, numbered shards (`-two`, `-twentyone`) and retired
//! `...Archive` collections. All of them collapse onto a single
//! `namespace:collection` name here.

use crate::domain::CanonicalName;
use crate::error::Error;
use config::Naming;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Trailing words marking one shard of a collection split across files.
static SHARD_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "-(archived|eight|eighteen|eleven|fifteen|five|four|fourteen|nine|nineteen|one|seven\
         |seventeen|six|sixteen|ten|thirteen|thirty|thirtyone|thirtytwo|three|twelve|twenty\
         |twentyeight|twentyfive|twentyfour|twentynine|twentyone|twentyseven|twentysix\
         |twentythree|twentytwo|two)$",
    )
    .expect("shard suffix pattern is valid")
});

/// Retired collection names and the name they were folded into.
pub const BUILTIN_ALIASES: &[(&str, &str)] = &[("agent_core:agentToDoArchive", "agent_core:agentToDo")];

/// The `(database, collection)` pair captured from a raw key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCollection<'a> {
    pub database: &'a str,
    pub collection: &'a str,
}

#[derive(Debug, Clone)]
pub struct Canonicalizer {
    name_pattern: Regex,
    aliases: BTreeMap<CanonicalName, CanonicalName>,
}

impl Canonicalizer {
    /// Build from the configured name pattern and aliases.
    ///
    /// The pattern must define `database` and `collection` groups. Aliases
    /// from the configuration override the built-in ones; an alias whose
    /// target is itself aliased is rejected so that resolution is a single
    /// step.
    pub fn new(naming: &Naming) -> Result<Self, Error> {
        let name_pattern = Regex::new(&naming.name_pattern)?;
        for group in ["database", "collection"] {
            if !name_pattern.capture_names().flatten().any(|name| name == group) {
                return Err(Error::MissingGroup {
                    pattern: naming.name_pattern.clone(),
                    group,
                });
            }
        }

        let mut aliases = BTreeMap::new();
        let configured = naming.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        for (from, to) in BUILTIN_ALIASES.iter().copied().chain(configured) {
            let invalid = |reason| Error::InvalidAlias {
                from: from.to_owned(),
                to: to.to_owned(),
                reason,
            };
            let from_name: CanonicalName = from.parse().map_err(|_| invalid("malformed source"))?;
            let to_name: CanonicalName = to.parse().map_err(|_| invalid("malformed target"))?;
            if from_name == to_name {
                return Err(invalid("alias points at itself"));
            }
            aliases.insert(from_name, to_name);
        }
        for (from, to) in &aliases {
            if aliases.contains_key(to) {
                return Err(Error::InvalidAlias {
                    from: from.to_string(),
                    to: to.to_string(),
                    reason: "target is itself an alias",
                });
            }
        }

        Ok(Self {
            name_pattern,
            aliases,
        })
    }

    /// Capture the raw database and collection from `key`.
    ///
    /// Only the final path segment is inspected, so directory names never
    /// masquerade as a database.
    pub fn extract<'a>(&self, key: &'a str) -> Option<RawCollection<'a>> {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        let captures = self.name_pattern.captures(file_name)?;
        Some(RawCollection {
            database: captures.name("database")?.as_str(),
            collection: captures.name("collection")?.as_str(),
        })
    }

    /// Canonical name for an object key, or `None` when the key does not
    /// match the name pattern.
    pub fn canonicalize(&self, key: &str) -> Option<CanonicalName> {
        let raw = self.extract(key)?;
        let collection = strip_shard_suffix(raw.collection);
        let name = CanonicalName::new(raw.database.replace('-', "_"), collection.replace('-', "_"));
        Some(self.resolve_alias(name))
    }

    /// Map a retired name onto its current name. Idempotent.
    pub fn resolve_alias(&self, name: CanonicalName) -> CanonicalName {
        match self.aliases.get(&name) {
            Some(target) => {
                debug!(original = %name, resolved = %target, "resolved collection alias");
                target.clone()
            }
            None => name,
        }
    }
}

/// Drop a trailing shard word such as `-two` or `-twentyone`.
///
/// ```
/// # use provisioner::naming::strip_shard_suffix;
/// assert_eq!(strip_shard_suffix("claimant-twentyone"), "claimant");
/// assert_eq!(strip_shard_suffix("claimant"), "claimant");
/// ```
pub fn strip_shard_suffix(collection: &str) -> &str {
    match SHARD_SUFFIX.find(collection) {
        Some(found) => {
            let stripped = &collection[..found.start()];
            info!(original = collection, coalesced = stripped, "using coalesced collection");
            stripped
        }
        None => collection,
    }
}
