use clap::Parser;
use config::Config;
use provisioner::{
    InventoryExpectation, Provisioner, Services, clock::TokioClock, cluster::InMemoryCluster,
    inventory::ObjectStoreLister,
};
use std::sync::Arc;
use table_provisioner::{Error, cli::Cli, signals::wait_for_shutdown, store};
use tracing::{debug, info, warn};
use tracing_log::AsTrace;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.log_level_filter().as_trace())
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => Config::from_env()?,
    };

    if cli.print_config {
        info!(config = %config.to_toml()?, "effective configuration");
        return Ok(());
    }

    let lister = ObjectStoreLister::new(store::open(&config.source)?);
    warn!("no live cluster connection configured, provisioning against an in-memory cluster");
    let services = Services {
        lister: Arc::new(lister),
        admin: Arc::new(InMemoryCluster::new()),
        clock: Arc::new(TokioClock),
    };
    let provisioner = Provisioner::new(config, services)?;

    let expectation = if cli.allow_empty {
        InventoryExpectation::AllowEmpty
    } else {
        InventoryExpectation::Required
    };

    let report = tokio::select! {
        report = provisioner.run(expectation) => report?,
        signal = wait_for_shutdown() => {
            let signal = signal?;
            tracing::error!(%signal, "shutdown requested, abandoning run");
            return Err(Error::Interrupted(signal).into());
        }
    };

    for table in &report.outcomes {
        info!(
            table = %table.name,
            regions = table.region_count,
            outcome = %table.outcome,
            "table outcome"
        );
    }
    info!(
        collections = report.inventory.len(),
        tables = report.counts.total(),
        created = report.counts.created,
        already_exists = report.counts.already_exists,
        timed_out = report.counts.timed_out,
        failed = report.counts.failed,
        "run complete"
    );
    Ok(())
}
