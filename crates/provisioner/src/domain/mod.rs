#![forbid(unsafe_code)]

mod inventory;
mod name;
mod outcome;
mod plan;

pub use inventory::{Inventory, InventoryEntry};
pub use name::CanonicalName;
pub use outcome::{CreationOutcome, OutcomeCounts, TableOutcome};
pub use plan::{AllocationEntry, AllocationPlan, KEYSPACE_SIZE, SplitKey, SplitPlan};
