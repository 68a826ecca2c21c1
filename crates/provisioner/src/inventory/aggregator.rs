#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::domain::Inventory;
use crate::error::Error;
use crate::inventory::{ListRequest, ObjectLister, ObjectSummary, with_backoff};
use crate::naming::Canonicalizer;
use config::{Retry, Source};
use humansize::{BINARY, format_size};
use regex::Regex;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

/// Decides which object keys count as collection exports.
#[derive(Debug, Clone)]
pub struct KeyFilter {
    filename: Regex,
    data_extension: Option<Regex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    Accepted,
    /// The file name does not look like an export at all.
    UnmatchedFormat,
    /// The file name matches but is not a data file.
    NotDataFile,
}

impl KeyFilter {
    pub fn new(source: &Source) -> Result<Self, Error> {
        Ok(Self {
            filename: Regex::new(&source.filename_pattern)?,
            data_extension: source
                .data_extension_pattern
                .as_deref()
                .map(Regex::new)
                .transpose()?,
        })
    }

    /// Classify `key` by its final path segment.
    pub fn check(&self, key: &str) -> KeyMatch {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        if !self.filename.is_match(file_name) {
            return KeyMatch::UnmatchedFormat;
        }
        match &self.data_extension {
            Some(extension) if !extension.is_match(file_name) => KeyMatch::NotDataFile,
            _ => KeyMatch::Accepted,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PrefixStats {
    pages: usize,
    accepted: usize,
    unmatched: usize,
    zero_byte: usize,
}

/// Sums export sizes per canonical collection across source prefixes.
pub struct InventoryAggregator {
    lister: Arc<dyn ObjectLister>,
    clock: Arc<dyn Clock>,
    canonicalizer: Arc<Canonicalizer>,
    filter: KeyFilter,
    retry: Retry,
    page_size: usize,
}

impl InventoryAggregator {
    pub fn new(
        lister: Arc<dyn ObjectLister>,
        clock: Arc<dyn Clock>,
        canonicalizer: Arc<Canonicalizer>,
        source: &Source,
        retry: Retry,
    ) -> Result<Self, Error> {
        Ok(Self {
            lister,
            clock,
            canonicalizer,
            filter: KeyFilter::new(source)?,
            retry,
            page_size: source.page_size,
        })
    }

    /// Walk every prefix and total object sizes per canonical name.
    ///
    /// Fails as soon as any prefix cannot be listed: a partial inventory
    /// would under-provision the collections it misses.
    pub async fn aggregate(&self, prefixes: &[String]) -> Result<Inventory, Error> {
        let mut inventory = Inventory::default();
        for prefix in prefixes {
            let span = info_span!("aggregate", %prefix);
            let found = self.aggregate_prefix(prefix).instrument(span).await?;
            inventory.merge(found);
        }

        for entry in inventory.entries() {
            debug!(
                table = %entry.name,
                bytes = entry.total_bytes,
                size = %format_size(entry.total_bytes, BINARY),
                "collection total"
            );
        }
        info!(
            prefixes = prefixes.len(),
            collections = inventory.len(),
            total_bytes = inventory.total_bytes(),
            "gathered collections to provision"
        );
        Ok(inventory)
    }

    async fn aggregate_prefix(&self, prefix: &str) -> Result<Inventory, Error> {
        let mut inventory = Inventory::default();
        let mut stats = PrefixStats::default();
        let mut request = ListRequest {
            prefix: prefix.to_owned(),
            continuation_token: None,
            max_keys: self.page_size,
        };

        loop {
            let page = with_backoff(&self.retry, self.clock.as_ref(), || {
                self.lister.list(&request)
            })
            .await
            .map_err(|(source, attempts)| {
                if source.is_transient() {
                    Error::ListingExhausted {
                        prefix: prefix.to_owned(),
                        attempts,
                        source,
                    }
                } else {
                    Error::Listing {
                        prefix: prefix.to_owned(),
                        source,
                    }
                }
            })?;
            stats.pages += 1;

            for object in &page.objects {
                self.consider(object, &mut inventory, &mut stats);
            }

            match page.continuation() {
                Some(token) => request.continuation_token = Some(token.to_owned()),
                None => break,
            }
        }

        info!(
            pages = stats.pages,
            accepted = stats.accepted,
            unmatched = stats.unmatched,
            zero_byte = stats.zero_byte,
            collections = inventory.len(),
            "listed prefix"
        );
        Ok(inventory)
    }

    fn consider(&self, object: &ObjectSummary, inventory: &mut Inventory, stats: &mut PrefixStats) {
        match self.filter.check(&object.key) {
            KeyMatch::Accepted => {}
            KeyMatch::UnmatchedFormat => {
                warn!(key = %object.key, "key does not match filename format, skipping");
                stats.unmatched += 1;
                return;
            }
            KeyMatch::NotDataFile => {
                warn!(key = %object.key, "key matches format but not data extension, skipping");
                stats.unmatched += 1;
                return;
            }
        }

        let Some(name) = self.canonicalizer.canonicalize(&object.key) else {
            warn!(key = %object.key, "no collection name in key, skipping");
            stats.unmatched += 1;
            return;
        };

        if object.size == 0 {
            info!(key = %object.key, table = %name, "zero-byte object");
            stats.zero_byte += 1;
        }
        stats.accepted += 1;
        inventory.record(name, object.size);
    }
}
