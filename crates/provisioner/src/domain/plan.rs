#![forbid(unsafe_code)]

use crate::domain::CanonicalName;
use std::fmt;

/// Number of distinct two-byte row key prefixes.
pub const KEYSPACE_SIZE: u32 = 256 * 256;

/// Region count assigned to one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationEntry {
    pub name: CanonicalName,
    pub total_bytes: u64,
    /// Always at least 1.
    pub region_count: u32,
}

impl AllocationEntry {
    /// Split keys needed to create `region_count` regions.
    pub fn split_count(&self) -> usize {
        self.region_count.saturating_sub(1) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Bytes represented by one region.
    pub region_unit: u64,
    pub total_bytes: u64,
    pub total_regions_for_tables: u64,
    /// Ordered largest collection first.
    pub entries: Vec<AllocationEntry>,
}

impl AllocationPlan {
    pub fn total_regions(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.region_count)).sum()
    }

    pub fn get(&self, name: &CanonicalName) -> Option<&AllocationEntry> {
        self.entries.iter().find(|e| &e.name == name)
    }
}

/// Big-endian two-byte region boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplitKey([u8; 2]);

impl SplitKey {
    pub fn position(&self) -> u32 {
        u32::from(u16::from_be_bytes(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl From<u16> for SplitKey {
    fn from(position: u16) -> Self {
        Self(position.to_be_bytes())
    }
}

impl fmt::Debug for SplitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\x{:02X}\\x{:02X}", self.0[0], self.0[1])
    }
}

/// Split boundaries for one table, `region_count - 1` of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub name: CanonicalName,
    pub boundaries: Vec<SplitKey>,
}
