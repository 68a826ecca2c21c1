#![forbid(unsafe_code)]

mod admin;
mod guard;
mod memory;

pub use admin::{
    AdminError, ClusterAdmin, ColumnFamilyDescriptor, Compression, Creation, TableDescriptor,
};
pub use guard::IdempotencyGuard;
pub use memory::{Availability, CreatedTable, InMemoryCluster};
