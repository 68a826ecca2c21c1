#![forbid(unsafe_code)]

//! Table creation in size-ordered batches.
//!
//! Collections are sorted largest first and cut into chunks. Within a chunk,
//! small tables are created concurrently while a table with more split keys
//! than the large-table threshold is created and awaited on its own before
//! the rest of the chunk is dispatched. A chunk finishes before the next one
//! starts.

use crate::allocation::split_plan;
use crate::clock::Clock;
use crate::cluster::{AdminError, ClusterAdmin, Creation, IdempotencyGuard, TableDescriptor};
use crate::domain::{
    AllocationEntry, AllocationPlan, CanonicalName, CreationOutcome, SplitKey, TableOutcome,
};
use crate::error::Error;
use itertools::Itertools;
use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Everything needed to create one table.
#[derive(Debug, Clone)]
struct TableJob {
    index: usize,
    descriptor: TableDescriptor,
    region_count: u32,
    splits: Vec<SplitKey>,
    synchronous: bool,
}

/// Per-table work shared by every task of a run.
#[derive(Clone)]
struct TableWorker {
    admin: Arc<dyn ClusterAdmin>,
    clock: Arc<dyn Clock>,
    guard: Arc<IdempotencyGuard>,
    creation_timeout: Duration,
    poll_interval: Duration,
}

impl TableWorker {
    /// Drive one table to a terminal state.
    ///
    /// Rejections become [`CreationOutcome::Failed`]; an unreachable cluster
    /// is returned as an error.
    async fn run(&self, job: &TableJob) -> Result<CreationOutcome, AdminError> {
        match self.provision(job).await {
            Err(AdminError::Rejected(reason)) => {
                error!(table = %job.descriptor.name, %reason, "table creation failed");
                Ok(CreationOutcome::Failed(reason))
            }
            other => other,
        }
    }

    async fn provision(&self, job: &TableJob) -> Result<CreationOutcome, AdminError> {
        let name = &job.descriptor.name;

        self.guard
            .ensure_namespace(self.admin.as_ref(), name.namespace())
            .await?;
        debug!(table = %name, "namespace ensured");

        if self.guard.table_exists(name) {
            warn!(table = %name, "table already exists, skipping");
            return Ok(CreationOutcome::AlreadyExists);
        }

        info!(
            table = %name,
            regions = job.region_count,
            splits = job.splits.len(),
            synchronous = job.synchronous,
            "creating table"
        );
        let started = self.clock.now();
        let creation = if job.synchronous {
            self.admin.create_table(&job.descriptor, &job.splits).await?
        } else {
            self.admin
                .create_table_async(&job.descriptor, &job.splits)
                .await?
        };
        self.guard.record_table(name);
        if creation == Creation::AlreadyExists {
            warn!(table = %name, "table created concurrently by another process, skipping");
            return Ok(CreationOutcome::AlreadyExists);
        }

        match tokio::time::timeout(self.creation_timeout, self.wait_until_available(name)).await {
            Ok(Ok(())) => {
                info!(
                    table = %name,
                    regions = job.region_count,
                    elapsed = ?self.clock.now().duration_since(started),
                    "created table"
                );
                Ok(CreationOutcome::Created)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!(
                    table = %name,
                    timeout = ?self.creation_timeout,
                    "table not available before timeout, moving on"
                );
                Ok(CreationOutcome::TimedOut)
            }
        }
    }

    async fn wait_until_available(&self, name: &CanonicalName) -> Result<(), AdminError> {
        while !self.admin.is_table_available(name).await? {
            self.clock.sleep(self.poll_interval).await;
        }
        Ok(())
    }
}

pub struct ProvisionScheduler {
    admin: Arc<dyn ClusterAdmin>,
    clock: Arc<dyn Clock>,
    settings: config::Scheduler,
    table: config::Table,
}

impl ProvisionScheduler {
    pub fn new(
        admin: Arc<dyn ClusterAdmin>,
        clock: Arc<dyn Clock>,
        settings: config::Scheduler,
        table: config::Table,
    ) -> Self {
        Self {
            admin,
            clock,
            settings,
            table,
        }
    }

    /// Create a table for every entry of `plan`.
    ///
    /// Returns one outcome per entry, in descending size order. A failure of
    /// one table never stops the others; losing the cluster stops the run
    /// once the current chunk has drained.
    pub async fn provision(&self, plan: &AllocationPlan) -> Result<Vec<TableOutcome>, Error> {
        let guard = Arc::new(IdempotencyGuard::load(self.admin.as_ref()).await?);
        let worker = TableWorker {
            admin: self.admin.clone(),
            clock: self.clock.clone(),
            guard,
            creation_timeout: self.settings.creation_timeout,
            poll_interval: self.settings.poll_interval,
        };

        let jobs = self.jobs(plan);
        let chunk_size = self.settings.chunk_size.max(1);
        let chunk_count = jobs.len().div_ceil(chunk_size);
        let mut outcomes = Vec::with_capacity(jobs.len());

        for (chunk_index, chunk) in jobs.chunks(chunk_size).enumerate() {
            let span = info_span!("chunk", index = chunk_index + 1, of = chunk_count);
            let finished = Self::run_chunk(&worker, chunk).instrument(span).await?;
            outcomes.extend(finished);
        }

        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }

    fn jobs(&self, plan: &AllocationPlan) -> Vec<TableJob> {
        plan.entries
            .iter()
            .sorted_by_key(|entry| {
                (
                    Reverse(entry.total_bytes),
                    Reverse(entry.region_count),
                    entry.name.clone(),
                )
            })
            .enumerate()
            .map(|(index, entry)| self.job(index, entry))
            .collect()
    }

    fn job(&self, index: usize, entry: &AllocationEntry) -> TableJob {
        let splits = split_plan(entry).boundaries;
        TableJob {
            index,
            descriptor: TableDescriptor::new(entry.name.clone(), &self.table),
            region_count: entry.region_count,
            synchronous: splits.len() > self.settings.large_table_threshold,
            splits,
        }
    }

    async fn run_chunk(
        worker: &TableWorker,
        chunk: &[TableJob],
    ) -> Result<Vec<(usize, TableOutcome)>, Error> {
        let mut finished = Vec::with_capacity(chunk.len());
        let mut tasks = JoinSet::new();
        let mut fatal = None;

        let (large, small): (Vec<&TableJob>, Vec<&TableJob>) =
            chunk.iter().partition(|job| job.synchronous);

        for job in large {
            let span = info_span!("table", name = %job.descriptor.name);
            match worker.run(job).instrument(span).await {
                Ok(outcome) => finished.push(Self::outcome(job, outcome)),
                Err(err) => {
                    fatal = Some(err);
                    break;
                }
            }
        }

        if fatal.is_none() {
            for job in small {
                let worker = worker.clone();
                let job = job.clone();
                let span = info_span!("table", name = %job.descriptor.name);
                tasks.spawn(
                    async move {
                        let result = worker.run(&job).await;
                        (job, result)
                    }
                    .instrument(span),
                );
            }
        }

        while let Some(joined) = tasks.join_next().await {
            let (job, result) = joined?;
            match result {
                Ok(outcome) => finished.push(Self::outcome(&job, outcome)),
                Err(err) => {
                    fatal.get_or_insert(err);
                }
            }
        }

        match fatal {
            Some(err) => Err(Error::Cluster(err)),
            None => Ok(finished),
        }
    }

    fn outcome(job: &TableJob, outcome: CreationOutcome) -> (usize, TableOutcome) {
        (
            job.index,
            TableOutcome {
                name: job.descriptor.name.clone(),
                region_count: job.region_count,
                outcome,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::cluster::{Availability, Compression, InMemoryCluster};
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    fn settings(chunk_size: usize, large_table_threshold: usize) -> config::Scheduler {
        config::Scheduler {
            chunk_size,
            large_table_threshold,
            creation_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }

    fn plan(entries: &[(&str, u64, u32)]) -> AllocationPlan {
        AllocationPlan {
            region_unit: 1,
            total_bytes: entries.iter().map(|e| e.1).sum(),
            total_regions_for_tables: entries.iter().map(|e| u64::from(e.2)).sum(),
            entries: entries
                .iter()
                .map(|(name, bytes, regions)| AllocationEntry {
                    name: name.parse().unwrap(),
                    total_bytes: *bytes,
                    region_count: *regions,
                })
                .collect(),
        }
    }

    fn scheduler(cluster: &Arc<InMemoryCluster>, settings: config::Scheduler) -> ProvisionScheduler {
        ProvisionScheduler::new(
            cluster.clone(),
            Arc::new(TokioClock),
            settings,
            config::Table::default(),
        )
    }

    fn outcomes(results: &[TableOutcome]) -> Vec<(String, CreationOutcome)> {
        results
            .iter()
            .map(|r| (r.name.to_string(), r.outcome.clone()))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn creates_tables_with_splits_and_namespaces() {
        let cluster = Arc::new(InMemoryCluster::new());
        let scheduler = scheduler(&cluster, settings(4, 32));
        let plan = plan(&[("core:toDo", 500, 5), ("accepted_data:address", 100, 1)]);

        let results = scheduler.provision(&plan).await.unwrap();

        assert_eq!(
            outcomes(&results),
            [
                ("core:toDo".to_string(), CreationOutcome::Created),
                ("accepted_data:address".to_string(), CreationOutcome::Created),
            ]
        );
        assert_eq!(cluster.namespaces(), ["accepted_data", "core"]);

        let todo = cluster.created_table(&"core:toDo".parse().unwrap()).unwrap();
        let positions: Vec<u32> = todo.splits.iter().map(SplitKey::position).collect();
        assert_eq!(positions, [0x3334, 0x6667, 0x999A, 0xCCCD]);
        assert_eq!(todo.descriptor.column_family.max_versions, u32::MAX);
        assert_eq!(todo.descriptor.column_family.min_versions, 1);
        assert_eq!(todo.descriptor.column_family.compression, Compression::Gz);
        assert_eq!(
            todo.descriptor.column_family.compaction_compression,
            Compression::Gz
        );

        let address = cluster
            .created_table(&"accepted_data:address".parse().unwrap())
            .unwrap();
        assert!(address.splits.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn existing_tables_are_skipped() {
        let existing: CanonicalName = "core:toDo".parse().unwrap();
        let cluster = Arc::new(InMemoryCluster::new().with_table(&existing));
        let scheduler = scheduler(&cluster, settings(4, 32));

        let results = scheduler
            .provision(&plan(&[("core:toDo", 500, 5), ("core:claimant", 100, 1)]))
            .await
            .unwrap();

        assert_eq!(
            outcomes(&results),
            [
                ("core:toDo".to_string(), CreationOutcome::AlreadyExists),
                ("core:claimant".to_string(), CreationOutcome::Created),
            ]
        );
        assert_eq!(cluster.creation_calls(), 1);
        assert_eq!(cluster.namespace_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn large_tables_are_created_synchronously_first() {
        let cluster = Arc::new(
            InMemoryCluster::new().with_sync_latency(Duration::from_secs(5)),
        );
        // threshold 3: 5 regions means 4 splits, so core:big is large
        let scheduler = scheduler(&cluster, settings(10, 3));
        let start = Instant::now();

        scheduler
            .provision(&plan(&[
                ("core:small1", 10, 2),
                ("core:big", 1000, 5),
                ("core:small2", 20, 3),
            ]))
            .await
            .unwrap();

        let tables = cluster.created_tables();
        let names: Vec<String> = tables
            .iter()
            .map(|t| t.descriptor.name.to_string())
            .collect();
        assert_eq!(names[0], "core:big");
        assert!(tables[0].synchronous);
        assert_eq!(tables[0].finished_at - start, Duration::from_secs(5));
        for small in &tables[1..] {
            assert!(!small.synchronous);
            assert!(small.requested_at >= tables[0].finished_at);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn chunks_run_in_descending_size_order() {
        let cluster = Arc::new(
            InMemoryCluster::new().with_availability(Availability::After(Duration::from_secs(2))),
        );
        let scheduler = scheduler(&cluster, settings(2, 32));

        scheduler
            .provision(&plan(&[
                ("core:c", 30, 1),
                ("core:a", 50, 1),
                ("core:e", 10, 1),
                ("core:b", 40, 1),
                ("core:d", 20, 1),
            ]))
            .await
            .unwrap();

        let tables = cluster.created_tables();
        let requested = |name: &str| {
            tables
                .iter()
                .find(|t| t.descriptor.name.to_string() == name)
                .map(|t| t.requested_at)
                .unwrap()
        };
        // chunks: [a, b], [c, d], [e]; each waits for availability before the next
        assert_eq!(requested("core:a"), requested("core:b"));
        assert!(requested("core:c") >= requested("core:a") + Duration::from_secs(2));
        assert_eq!(requested("core:c"), requested("core:d"));
        assert!(requested("core:e") >= requested("core:c") + Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_table_times_out_without_blocking_others() {
        let cluster = Arc::new(InMemoryCluster::new().with_availability(Availability::Never));
        let mut settings = settings(4, 32);
        settings.creation_timeout = Duration::from_secs(10);
        let scheduler = scheduler(&cluster, settings);
        let start = Instant::now();

        let results = scheduler
            .provision(&plan(&[("core:a", 2, 1), ("core:b", 1, 1)]))
            .await
            .unwrap();

        assert!(results.iter().all(|r| r.outcome == CreationOutcome::TimedOut));
        // both waits run concurrently
        assert!(start.elapsed() < Duration::from_secs(20));
        assert_eq!(cluster.creation_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_table_fails_alone() {
        let rejected: CanonicalName = "core:a".parse().unwrap();
        let cluster = Arc::new(InMemoryCluster::new().rejecting(&rejected));
        let scheduler = scheduler(&cluster, settings(4, 32));

        let results = scheduler
            .provision(&plan(&[("core:a", 2, 1), ("core:b", 1, 1)]))
            .await
            .unwrap();

        assert!(matches!(results[0].outcome, CreationOutcome::Failed(_)));
        assert_eq!(results[1].outcome, CreationOutcome::Created);
    }

    #[tokio::test(start_paused = true)]
    async fn offline_cluster_aborts_the_run() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.set_unavailable(true);
        let scheduler = scheduler(&cluster, settings(4, 32));

        let err = scheduler
            .provision(&plan(&[("core:a", 2, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cluster(AdminError::Unavailable(_))));
    }
}
