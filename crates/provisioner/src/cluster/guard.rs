#![forbid(unsafe_code)]

use crate::cluster::{AdminError, ClusterAdmin, Creation};
use crate::domain::CanonicalName;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, info};

/// Known namespaces and tables, read once from the cluster when a run starts.
///
/// Shared by every concurrent table task. The sets only ever grow, and a lost
/// creation race is reported by the cluster as [`Creation::AlreadyExists`],
/// so locks are never held across a cluster call.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    namespaces: Mutex<HashSet<String>>,
    tables: Mutex<HashSet<String>>,
}

impl IdempotencyGuard {
    pub async fn load(admin: &dyn ClusterAdmin) -> Result<Self, AdminError> {
        let namespaces: HashSet<String> = admin.list_namespaces().await?.into_iter().collect();
        let tables: HashSet<String> = admin.list_table_names().await?.into_iter().collect();
        debug!(
            namespaces = namespaces.len(),
            tables = tables.len(),
            "loaded cluster metadata"
        );
        Ok(Self {
            namespaces: Mutex::new(namespaces),
            tables: Mutex::new(tables),
        })
    }

    /// Create `namespace` unless it is already known.
    ///
    /// Returns [`Creation::AlreadyExists`] without calling the cluster when
    /// the namespace is cached.
    pub async fn ensure_namespace(
        &self,
        admin: &dyn ClusterAdmin,
        namespace: &str,
    ) -> Result<Creation, AdminError> {
        if self.namespaces.lock().contains(namespace) {
            return Ok(Creation::AlreadyExists);
        }

        info!(namespace, "creating namespace");
        let creation = admin.create_namespace(namespace).await?;
        if creation == Creation::AlreadyExists {
            info!(
                namespace,
                "namespace already exists, probably created by another process"
            );
        }
        self.namespaces.lock().insert(namespace.to_owned());
        Ok(creation)
    }

    pub fn table_exists(&self, name: &CanonicalName) -> bool {
        self.tables.lock().contains(&name.to_string())
    }

    pub fn record_table(&self, name: &CanonicalName) {
        self.tables.lock().insert(name.to_string());
    }
}
