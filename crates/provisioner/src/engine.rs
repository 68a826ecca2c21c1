#![forbid(unsafe_code)]

use crate::allocation::RegionPlanner;
use crate::clock::Clock;
use crate::cluster::ClusterAdmin;
use crate::domain::{AllocationPlan, Inventory, OutcomeCounts, TableOutcome};
use crate::error::Error;
use crate::inventory::{InventoryAggregator, ObjectLister};
use crate::naming::Canonicalizer;
use crate::scheduler::ProvisionScheduler;
use config::Config;
use humansize::{BINARY, format_size};
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};

pub struct Services {
    pub lister: Arc<dyn ObjectLister>,
    pub admin: Arc<dyn ClusterAdmin>,
    pub clock: Arc<dyn Clock>,
}

/// Whether a run that finds no collections is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryExpectation {
    #[default]
    Required,
    AllowEmpty,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub inventory: Inventory,
    /// `None` when the inventory was empty and that was allowed.
    pub plan: Option<AllocationPlan>,
    /// One per planned table, largest first.
    pub outcomes: Vec<TableOutcome>,
    pub counts: OutcomeCounts,
}

pub struct Provisioner {
    config: Config,
    services: Services,
    aggregator: InventoryAggregator,
    planner: RegionPlanner,
}

impl Provisioner {
    /// Validate `config` and wire up the pipeline. Nothing is listed or
    /// created until [`Provisioner::run`].
    pub fn new(config: Config, services: Services) -> Result<Self, Error> {
        config.validate()?;
        let canonicalizer = Arc::new(Canonicalizer::new(&config.naming)?);
        let aggregator = InventoryAggregator::new(
            services.lister.clone(),
            services.clock.clone(),
            canonicalizer,
            &config.source,
            config.retry,
        )?;
        let planner = RegionPlanner::new(config.capacity);
        Ok(Self {
            config,
            services,
            aggregator,
            planner,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Inventory the source, plan regions and create every missing table.
    pub async fn run(&self, expectation: InventoryExpectation) -> Result<RunReport, Error> {
        let prefixes = self.config.source.full_prefixes();
        let inventory = self
            .aggregator
            .aggregate(&prefixes)
            .instrument(info_span!("inventory", bucket = %self.config.source.bucket))
            .await?;

        if inventory.is_empty() {
            match expectation {
                InventoryExpectation::Required => return Err(Error::EmptyInventory),
                InventoryExpectation::AllowEmpty => {
                    warn!("no collections found, nothing to provision");
                    return Ok(RunReport {
                        inventory,
                        plan: None,
                        outcomes: Vec::new(),
                        counts: OutcomeCounts::default(),
                    });
                }
            }
        }

        let plan = self.planner.plan(&inventory)?;
        info!(
            tables = plan.entries.len(),
            regions = plan.total_regions(),
            region_unit = %format_size(plan.region_unit, BINARY),
            "planned region allocation"
        );

        let scheduler = ProvisionScheduler::new(
            self.services.admin.clone(),
            self.services.clock.clone(),
            self.config.scheduler.clone(),
            self.config.table.clone(),
        );
        let outcomes = scheduler
            .provision(&plan)
            .instrument(info_span!("provision", tables = plan.entries.len()))
            .await?;
        let counts: OutcomeCounts = outcomes.iter().map(|o| &o.outcome).collect();

        info!(
            created = counts.created,
            already_exists = counts.already_exists,
            timed_out = counts.timed_out,
            failed = counts.failed,
            "provisioning finished"
        );
        Ok(RunReport {
            inventory,
            plan: Some(plan),
            outcomes,
            counts,
        })
    }
}
