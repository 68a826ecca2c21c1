#![forbid(unsafe_code)]

use crate::domain::CanonicalName;
use std::fmt;

/// Terminal state of one collection in a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    /// The table was created and reported available.
    Created,
    /// The table was already in the cluster; nothing was created.
    AlreadyExists,
    /// The table was requested but did not become available in time.
    TimedOut,
    /// The cluster refused to create the table.
    Failed(String),
}

impl fmt::Display for CreationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::AlreadyExists => f.write_str("already exists"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// What happened to one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub name: CanonicalName,
    pub region_count: u32,
    pub outcome: CreationOutcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub created: usize,
    pub already_exists: usize,
    pub timed_out: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &CreationOutcome) {
        match outcome {
            CreationOutcome::Created => self.created += 1,
            CreationOutcome::AlreadyExists => self.already_exists += 1,
            CreationOutcome::TimedOut => self.timed_out += 1,
            CreationOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.already_exists + self.timed_out + self.failed
    }
}

impl<'a> FromIterator<&'a CreationOutcome> for OutcomeCounts {
    fn from_iter<T: IntoIterator<Item = &'a CreationOutcome>>(iter: T) -> Self {
        let mut counts = Self::default();
        for outcome in iter {
            counts.record(outcome);
        }
        counts
    }
}
