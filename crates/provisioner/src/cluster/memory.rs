#![forbid(unsafe_code)]

use crate::cluster::{AdminError, ClusterAdmin, Creation, TableDescriptor};
use crate::domain::{CanonicalName, SplitKey};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// When a freshly requested table starts reporting available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Immediate,
    After(Duration),
    Never,
}

#[derive(Debug, Clone)]
pub struct CreatedTable {
    pub descriptor: TableDescriptor,
    pub splits: Vec<SplitKey>,
    /// Requested through [`ClusterAdmin::create_table`].
    pub synchronous: bool,
    pub requested_at: Instant,
    pub finished_at: Instant,
}

#[derive(Debug, Default)]
struct State {
    namespaces: BTreeSet<String>,
    /// Tables present before this process touched the cluster.
    existing: BTreeSet<String>,
    created: BTreeMap<String, CreatedTable>,
    creation_calls: usize,
    namespace_calls: usize,
}

/// A cluster held entirely in memory.
///
/// Serves as the dry-run target of the command line tool and as the test
/// double for the scheduler. Every creation is recorded with its descriptor
/// and split keys.
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    state: Mutex<State>,
    availability: Availability,
    sync_latency: Duration,
    rejected: HashSet<String>,
    unavailable: AtomicBool,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(self, namespace: &str) -> Self {
        self.state.lock().namespaces.insert(namespace.to_owned());
        self
    }

    /// Seed an existing table, creating its namespace too.
    pub fn with_table(self, name: &CanonicalName) -> Self {
        {
            let mut state = self.state.lock();
            state.namespaces.insert(name.namespace().to_owned());
            state.existing.insert(name.to_string());
        }
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// How long [`ClusterAdmin::create_table`] takes to return.
    pub fn with_sync_latency(mut self, latency: Duration) -> Self {
        self.sync_latency = latency;
        self
    }

    /// Refuse to create `name`.
    pub fn rejecting(mut self, name: &CanonicalName) -> Self {
        self.rejected.insert(name.to_string());
        self
    }

    /// Simulate losing the connection to the cluster.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn creation_calls(&self) -> usize {
        self.state.lock().creation_calls
    }

    pub fn namespace_calls(&self) -> usize {
        self.state.lock().namespace_calls
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.state.lock().namespaces.iter().cloned().collect()
    }

    pub fn created_table(&self, name: &CanonicalName) -> Option<CreatedTable> {
        self.state.lock().created.get(&name.to_string()).cloned()
    }

    /// Tables created by this process, in request order.
    pub fn created_tables(&self) -> Vec<CreatedTable> {
        let mut tables: Vec<CreatedTable> = self.state.lock().created.values().cloned().collect();
        tables.sort_by_key(|table| table.requested_at);
        tables
    }

    fn check_reachable(&self) -> Result<(), AdminError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AdminError::Unavailable("in-memory cluster is offline".into()))
        } else {
            Ok(())
        }
    }

    fn exists(state: &State, name: &str) -> bool {
        state.existing.contains(name) || state.created.contains_key(name)
    }

    async fn create(
        &self,
        descriptor: &TableDescriptor,
        splits: &[SplitKey],
        synchronous: bool,
    ) -> Result<Creation, AdminError> {
        self.check_reachable()?;
        let name = descriptor.name.to_string();
        {
            let mut state = self.state.lock();
            state.creation_calls += 1;
            if !state.namespaces.contains(descriptor.name.namespace()) {
                return Err(AdminError::Rejected(format!(
                    "namespace {} does not exist",
                    descriptor.name.namespace()
                )));
            }
            if Self::exists(&state, &name) {
                return Ok(Creation::AlreadyExists);
            }
        }
        if self.rejected.contains(&name) {
            return Err(AdminError::Rejected(format!("table {name} refused")));
        }

        let requested_at = Instant::now();
        if synchronous && !self.sync_latency.is_zero() {
            tokio::time::sleep(self.sync_latency).await;
        }

        let mut state = self.state.lock();
        if Self::exists(&state, &name) {
            return Ok(Creation::AlreadyExists);
        }
        info!(
            table = %name,
            regions = splits.len() + 1,
            synchronous,
            "in-memory cluster created table"
        );
        state.created.insert(
            name,
            CreatedTable {
                descriptor: descriptor.clone(),
                splits: splits.to_vec(),
                synchronous,
                requested_at,
                finished_at: Instant::now(),
            },
        );
        Ok(Creation::Created)
    }
}

#[async_trait]
impl ClusterAdmin for InMemoryCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>, AdminError> {
        self.check_reachable()?;
        Ok(self.namespaces())
    }

    async fn create_namespace(&self, namespace: &str) -> Result<Creation, AdminError> {
        self.check_reachable()?;
        let mut state = self.state.lock();
        state.namespace_calls += 1;
        if state.namespaces.insert(namespace.to_owned()) {
            Ok(Creation::Created)
        } else {
            Ok(Creation::AlreadyExists)
        }
    }

    async fn list_table_names(&self) -> Result<Vec<String>, AdminError> {
        self.check_reachable()?;
        let state = self.state.lock();
        Ok(state
            .existing
            .iter()
            .chain(state.created.keys())
            .cloned()
            .collect())
    }

    async fn create_table(
        &self,
        descriptor: &TableDescriptor,
        splits: &[SplitKey],
    ) -> Result<Creation, AdminError> {
        self.create(descriptor, splits, true).await
    }

    async fn create_table_async(
        &self,
        descriptor: &TableDescriptor,
        splits: &[SplitKey],
    ) -> Result<Creation, AdminError> {
        self.create(descriptor, splits, false).await
    }

    async fn is_table_available(&self, name: &CanonicalName) -> Result<bool, AdminError> {
        self.check_reachable()?;
        let state = self.state.lock();
        let name = name.to_string();
        if state.existing.contains(&name) {
            return Ok(true);
        }
        let Some(table) = state.created.get(&name) else {
            return Ok(false);
        };
        Ok(match self.availability {
            Availability::Immediate => true,
            Availability::After(delay) => Instant::now() >= table.finished_at + delay,
            Availability::Never => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Table;

    fn descriptor(name: &str) -> TableDescriptor {
        TableDescriptor::new(name.parse().unwrap(), &Table::default())
    }

    #[tokio::test]
    async fn create_requires_namespace() {
        let cluster = InMemoryCluster::new();
        let err = cluster
            .create_table_async(&descriptor("core:toDo"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Rejected(_)));
    }

    #[tokio::test]
    async fn second_create_reports_existing() {
        let cluster = InMemoryCluster::new().with_namespace("core");
        let table = descriptor("core:toDo");

        assert_eq!(
            cluster.create_table_async(&table, &[]).await.unwrap(),
            Creation::Created
        );
        assert_eq!(
            cluster.create_table(&table, &[]).await.unwrap(),
            Creation::AlreadyExists
        );
        assert_eq!(cluster.creation_calls(), 2);
        assert_eq!(cluster.list_table_names().await.unwrap(), ["core:toDo"]);
    }

    #[tokio::test(start_paused = true)]
    async fn availability_follows_delay() {
        let cluster = InMemoryCluster::new()
            .with_namespace("core")
            .with_availability(Availability::After(Duration::from_secs(3)));
        let table = descriptor("core:toDo");
        cluster.create_table_async(&table, &[]).await.unwrap();

        assert!(!cluster.is_table_available(&table.name).await.unwrap());
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(cluster.is_table_available(&table.name).await.unwrap());
    }

    #[tokio::test]
    async fn offline_cluster_fails_every_call() {
        let cluster = InMemoryCluster::new();
        cluster.set_unavailable(true);
        assert!(matches!(
            cluster.list_namespaces().await,
            Err(AdminError::Unavailable(_))
        ));
        assert!(matches!(
            cluster.create_namespace("core").await,
            Err(AdminError::Unavailable(_))
        ));
    }
}
