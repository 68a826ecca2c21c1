#![forbid(unsafe_code)]

use crate::domain::{CanonicalName, SplitKey};
use async_trait::async_trait;
use config::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFamilyDescriptor {
    pub name: String,
    /// `u32::MAX` keeps every version.
    pub max_versions: u32,
    pub min_versions: u32,
    pub compression: Compression,
    pub compaction_compression: Compression,
}

impl ColumnFamilyDescriptor {
    /// Unbounded versions, at least one kept, GZIP on disk and in compactions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_versions: u32::MAX,
            min_versions: 1,
            compression: Compression::Gz,
            compaction_compression: Compression::Gz,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: CanonicalName,
    pub column_family: ColumnFamilyDescriptor,
    pub region_replication: u32,
}

impl TableDescriptor {
    pub fn new(name: CanonicalName, table: &Table) -> Self {
        Self {
            name,
            column_family: ColumnFamilyDescriptor::new(&table.column_family),
            region_replication: table.region_replication,
        }
    }
}

/// Result of a create call. Losing a creation race is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AdminError {
    /// The cluster cannot be reached; nothing further will succeed.
    #[error("cluster unavailable: {0}")]
    Unavailable(String),

    /// The cluster refused this one request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Administrative operations on the target cluster.
#[async_trait]
pub trait ClusterAdmin: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, AdminError>;

    async fn create_namespace(&self, namespace: &str) -> Result<Creation, AdminError>;

    /// Fully qualified `namespace:table` names.
    async fn list_table_names(&self) -> Result<Vec<String>, AdminError>;

    /// Create a table and return once the cluster has finished creating it.
    async fn create_table(
        &self,
        descriptor: &TableDescriptor,
        splits: &[SplitKey],
    ) -> Result<Creation, AdminError>;

    /// Submit a table creation and return without waiting for it.
    async fn create_table_async(
        &self,
        descriptor: &TableDescriptor,
        splits: &[SplitKey],
    ) -> Result<Creation, AdminError>;

    async fn is_table_available(&self, name: &CanonicalName) -> Result<bool, AdminError>;
}
