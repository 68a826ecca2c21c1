#![forbid(unsafe_code)]

mod capacity;
mod error;
mod naming;
mod retry;
mod scheduler;
mod source;
mod table;

pub use capacity::Capacity;
pub use error::Error;
pub use naming::Naming;
pub use retry::Retry;
pub use scheduler::Scheduler;
pub use source::Source;
pub use table::Table;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables with this prefix override file values.
///
/// Sections are separated by a double underscore, e.g.
/// `PROVISIONER_CAPACITY__SERVER_COUNT=8`.
pub const ENV_PREFIX: &str = "PROVISIONER_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: Source,
    pub naming: Naming,
    pub capacity: Capacity,
    pub scheduler: Scheduler,
    pub table: Table,
    pub retry: Retry,
}

impl Config {
    /// Built-in defaults, no file and no environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load defaults, then the TOML file at `path`, then the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_owned()));
        }
        Self::extract(Self::figment().merge(Toml::file(path)).merge(Self::env()))
    }

    /// Load defaults merged with the environment, without any file.
    pub fn from_env() -> Result<Self, Error> {
        Self::extract(Self::figment().merge(Self::env()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    /// Reject values the provisioning run cannot work with.
    pub fn validate(&self) -> Result<(), Error> {
        let capacity = &self.capacity;
        if capacity.region_target_per_server == 0 {
            return invalid("capacity.region_target_per_server must be positive");
        }
        if capacity.server_count == 0 {
            return invalid("capacity.server_count must be positive");
        }
        if capacity.replication_factor == 0 {
            return invalid("capacity.replication_factor must be positive");
        }
        if capacity.total_regions_for_all_tables() == 0 {
            return invalid(format!(
                "capacity leaves no regions for tables: {} regions across servers, replication factor {}",
                capacity.total_regions_for_all_servers(),
                capacity.replication_factor
            ));
        }
        if self.scheduler.chunk_size == 0 {
            return invalid("scheduler.chunk_size must be positive");
        }
        if self.source.page_size == 0 {
            return invalid("source.page_size must be positive");
        }
        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1");
        }
        if !(self.retry.backoff_multiplier >= 1.0) {
            return invalid("retry.backoff_multiplier must be at least 1.0");
        }
        Ok(())
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Self, Error> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(message: impl Into<String>) -> Result<(), Error> {
    Err(Error::Invalid(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn load_merges_file_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "provisioner.toml",
                r#"
                [source]
                bucket = "exports"
                prefixes = ["cluster-a", "cluster-b"]

                [capacity]
                region_target_per_server = 10
                server_count = 5
                replication_factor = 2

                [scheduler]
                creation_timeout = 30
                poll_interval = 250
                "#,
            )?;

            let config = Config::load("provisioner.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.source.bucket, "exports");
            assert_eq!(config.source.prefixes, ["cluster-a", "cluster-b"]);
            assert_eq!(config.capacity.server_count, 5);
            assert_eq!(config.scheduler.creation_timeout, Duration::from_secs(30));
            assert_eq!(config.scheduler.poll_interval, Duration::from_millis(250));
            // untouched sections keep their defaults
            assert_eq!(config.retry, Retry::default());
            assert_eq!(config.table, Table::default());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("provisioner.toml", "[capacity]\nserver_count = 5\n")?;
            jail.set_env("PROVISIONER_CAPACITY__SERVER_COUNT", "8");
            jail.set_env("PROVISIONER_TABLE__COLUMN_FAMILY", "topic");

            let config = Config::load("provisioner.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.capacity.server_count, 8);
            assert_eq!(config.table.column_family, "topic");
            Ok(())
        });
    }

    #[test]
    fn load_rejects_invalid_capacity() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "provisioner.toml",
                "[capacity]\nregion_target_per_server = 1\nserver_count = 1\nreplication_factor = 3\n",
            )?;
            let err = Config::load("provisioner.toml").unwrap_err();
            assert!(matches!(err, Error::Invalid(_)), "{err}");
            Ok(())
        });
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.scheduler.chunk_size = 0;
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn validate_rejects_shrinking_backoff() {
        let mut config = Config::default();
        config.retry.backoff_multiplier = 0.5;
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn toml_output_loads_back() {
        let mut config = Config::default();
        config.source.bucket = "exports".into();
        config.naming.aliases.insert("a:bArchive".into(), "a:b".into());

        Jail::expect_with(|jail| {
            jail.create_file("effective.toml", &config.to_toml().map_err(|e| e.to_string())?)?;
            let loaded = Config::load("effective.toml").map_err(|e| e.to_string())?;
            assert_eq!(loaded, config);
            Ok(())
        });
    }
}
