use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// Table Provisioner: size and pre-split HBase tables from an S3 export
///
/// Lists the exported collection files under the configured prefixes, shares
/// the cluster's region budget between collections in proportion to their
/// size, and creates one pre-split table per collection. Tables that already
/// exist are left alone, so the tool can be rerun safely.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// Without one, defaults and `PROVISIONER_*` environment variables are
    /// used.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    /// Succeed with nothing to do when no collections are found.
    #[arg(long)]
    pub allow_empty: bool,

    /// Log the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.is_file() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}
