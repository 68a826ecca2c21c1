#![forbid(unsafe_code)]

use crate::domain::CanonicalName;
use std::collections::BTreeMap;

/// Byte total of one canonical collection across every source prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub name: CanonicalName,
    pub total_bytes: u64,
}

/// Aggregated source inventory, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    totals: BTreeMap<CanonicalName, u64>,
}

impl Inventory {
    /// Add `bytes` to the running total of `name`.
    pub fn record(&mut self, name: CanonicalName, bytes: u64) {
        let total = self.totals.entry(name).or_default();
        *total = total.saturating_add(bytes);
    }

    /// Fold another inventory into this one, summing shared collections.
    pub fn merge(&mut self, other: Inventory) {
        for (name, bytes) in other.totals {
            self.record(name, bytes);
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.totals
            .values()
            .fold(0u64, |acc, bytes| acc.saturating_add(*bytes))
    }

    pub fn get(&self, name: &CanonicalName) -> Option<u64> {
        self.totals.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = InventoryEntry> + '_ {
        self.totals.iter().map(|(name, bytes)| InventoryEntry {
            name: name.clone(),
            total_bytes: *bytes,
        })
    }
}

impl FromIterator<(CanonicalName, u64)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (CanonicalName, u64)>>(iter: T) -> Self {
        let mut inventory = Inventory::default();
        for (name, bytes) in iter {
            inventory.record(name, bytes);
        }
        inventory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_shared_collections() {
        let name = CanonicalName::new("core", "toDo");
        let mut a: Inventory = [(name.clone(), 100)].into_iter().collect();
        let b: Inventory = [(name.clone(), 250), (CanonicalName::new("core", "claimant"), 7)]
            .into_iter()
            .collect();

        a.merge(b);

        assert_eq!(a.get(&name), Some(350));
        assert_eq!(a.len(), 2);
        assert_eq!(a.total_bytes(), 357);
    }

    #[test]
    fn zero_byte_collections_are_kept() {
        let mut inventory = Inventory::default();
        inventory.record(CanonicalName::new("core", "empty"), 0);
        assert!(!inventory.is_empty());
        assert_eq!(inventory.total_bytes(), 0);
    }
}
