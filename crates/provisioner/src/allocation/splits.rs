#![forbid(unsafe_code)]

use crate::domain::{AllocationEntry, KEYSPACE_SIZE, SplitKey, SplitPlan};

/// Evenly spaced boundaries dividing the two-byte keyspace into
/// `region_count` regions.
///
/// Partition sizes differ by at most one, with the first
/// `KEYSPACE_SIZE % region_count` partitions taking the extra unit. Counts
/// above the keyspace size are treated as the keyspace size, and zero as one.
///
/// ```
/// # use provisioner::allocation::splits;
/// assert!(splits(1).is_empty());
/// let positions: Vec<u32> = splits(4).iter().map(|key| key.position()).collect();
/// assert_eq!(positions, [0x4000, 0x8000, 0xC000]);
/// ```
pub fn splits(region_count: u32) -> Vec<SplitKey> {
    let regions = region_count.clamp(1, KEYSPACE_SIZE);
    let size = KEYSPACE_SIZE / regions;
    let mut remainder = KEYSPACE_SIZE % regions;

    let mut boundaries = Vec::with_capacity(regions as usize - 1);
    let mut previous = 0;
    for _ in 1..regions {
        let extra = if remainder > 0 {
            remainder -= 1;
            1
        } else {
            0
        };
        let next = previous + size + extra;
        // the last partition is never emitted, so `next` stays below KEYSPACE_SIZE
        boundaries.push(SplitKey::from(next as u16));
        previous = next;
    }
    boundaries
}

pub fn split_plan(entry: &AllocationEntry) -> SplitPlan {
    SplitPlan {
        name: entry.name.clone(),
        boundaries: splits(entry.region_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gaps(boundaries: &[SplitKey]) -> Vec<u32> {
        let mut previous = 0;
        boundaries
            .iter()
            .map(|key| {
                let gap = key.position() - previous;
                previous = key.position();
                gap
            })
            .collect()
    }

    #[test]
    fn one_region_has_no_splits() {
        assert!(splits(1).is_empty());
        assert!(splits(0).is_empty());
    }

    #[test]
    fn five_regions() {
        let keys: Vec<[u8; 2]> = splits(5).iter().map(|key| *key.as_bytes()).collect();
        assert_eq!(
            keys,
            [[0x33, 0x34], [0x66, 0x67], [0x99, 0x9A], [0xCC, 0xCD]]
        );
        assert_eq!(format!("{:?}", splits(5)[0]), "\\x33\\x34");
    }

    #[test]
    fn splits_are_equally_sized() {
        for region_count in 1..=10_000u32 {
            let result = splits(region_count);
            assert_eq!(result.len() as u32, region_count - 1);

            let size = KEYSPACE_SIZE / region_count;
            let remainder = KEYSPACE_SIZE % region_count;
            for (i, gap) in gaps(&result).into_iter().enumerate() {
                let expected = size + u32::from((i as u32) < remainder);
                assert_eq!(gap, expected, "region_count {region_count}, gap {i}");
            }
        }
    }

    #[test]
    fn whole_keyspace() {
        let result = splits(KEYSPACE_SIZE);
        assert_eq!(result.len(), 65_535);
        assert_eq!(result.first().map(SplitKey::position), Some(1));
        assert_eq!(result.last().map(SplitKey::position), Some(65_535));
        assert_eq!(splits(KEYSPACE_SIZE + 10), result);
    }

    proptest! {
        #[test]
        fn boundaries_strictly_increase_within_keyspace(region_count in 1u32..=KEYSPACE_SIZE) {
            let result = splits(region_count);
            prop_assert_eq!(result.len() as u32, region_count - 1);
            for pair in result.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for key in &result {
                prop_assert!((1..KEYSPACE_SIZE).contains(&key.position()));
            }
        }

        #[test]
        fn partitions_differ_by_at_most_one(region_count in 2u32..=KEYSPACE_SIZE) {
            let result = splits(region_count);
            let mut sizes = gaps(&result);
            sizes.push(KEYSPACE_SIZE - result.last().map(SplitKey::position).unwrap_or(0));
            let min = sizes.iter().min().copied().unwrap_or(0);
            let max = sizes.iter().max().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }
    }
}
