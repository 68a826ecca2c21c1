#![forbid(unsafe_code)]

use crate::domain::{AllocationEntry, AllocationPlan, Inventory, KEYSPACE_SIZE};
use crate::error::Error;
use config::Capacity;
use humansize::{BINARY, format_size};
use itertools::Itertools;
use std::cmp::Reverse;
use tracing::{debug, info, warn};

/// Spreads the regions the cluster can host across collections in proportion
/// to their size.
#[derive(Debug, Clone)]
pub struct RegionPlanner {
    capacity: Capacity,
}

impl RegionPlanner {
    pub fn new(capacity: Capacity) -> Self {
        Self { capacity }
    }

    /// Compute a region count for every collection in `inventory`.
    ///
    /// The region unit is the total byte count divided by the regions
    /// available to tables, floored and never below one byte. Each
    /// collection gets `ceil(bytes / unit)` regions, at least one and at most
    /// the keyspace size. Entries come back largest first, ties broken by
    /// name.
    pub fn plan(&self, inventory: &Inventory) -> Result<AllocationPlan, Error> {
        if inventory.is_empty() {
            return Err(Error::EmptyInventory);
        }

        let total_regions_for_tables = self.capacity.total_regions_for_all_tables();
        if total_regions_for_tables == 0 {
            return Err(Error::NoRegions);
        }

        let total_bytes = inventory.total_bytes();
        let region_unit = (total_bytes / total_regions_for_tables).max(1);

        info!(
            collections = inventory.len(),
            total_bytes,
            total = %format_size(total_bytes, BINARY),
            regions_for_servers = self.capacity.total_regions_for_all_servers(),
            regions_for_tables = total_regions_for_tables,
            region_unit,
            "planning region allocation"
        );

        let entries = inventory
            .entries()
            .map(|entry| {
                let region_count = Self::region_count(entry.total_bytes, region_unit);
                if region_count == KEYSPACE_SIZE {
                    warn!(
                        table = %entry.name,
                        bytes = entry.total_bytes,
                        "region count clamped to keyspace size"
                    );
                }
                debug!(
                    table = %entry.name,
                    bytes = entry.total_bytes,
                    regions = region_count,
                    "allocated regions"
                );
                AllocationEntry {
                    name: entry.name,
                    total_bytes: entry.total_bytes,
                    region_count,
                }
            })
            .sorted_by_key(|entry| (Reverse(entry.total_bytes), entry.name.clone()))
            .collect();

        Ok(AllocationPlan {
            region_unit,
            total_bytes,
            total_regions_for_tables,
            entries,
        })
    }

    fn region_count(bytes: u64, region_unit: u64) -> u32 {
        let regions = bytes.div_ceil(region_unit).clamp(1, u64::from(KEYSPACE_SIZE));
        // clamped to KEYSPACE_SIZE above, which fits in u32
        regions as u32
    }
}
