#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Cluster sizing used to spread regions across collections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Capacity {
    /// Regions each region server should end up hosting.
    pub region_target_per_server: u32,
    pub server_count: u32,
    /// Live copies kept of every region.
    pub replication_factor: u32,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            region_target_per_server: 10,
            server_count: 1,
            replication_factor: 3,
        }
    }
}

impl Capacity {
    pub fn total_regions_for_all_servers(&self) -> u64 {
        u64::from(self.region_target_per_server) * u64::from(self.server_count)
    }

    /// Regions available to tables once replicas are accounted for.
    ///
    /// Returns zero when the replication factor is zero.
    pub fn total_regions_for_all_tables(&self) -> u64 {
        self.total_regions_for_all_servers()
            .checked_div(u64::from(self.replication_factor))
            .unwrap_or(0)
    }
}
