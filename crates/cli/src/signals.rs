#![forbid(unsafe_code)]

use crate::error::Error;
use std::fmt;
use tokio::signal::unix::{SignalKind, signal};

/// Waits until the process is asked to stop and reports which signal did it.
pub async fn wait_for_shutdown() -> Result<Shutdown, Error> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(Error::SignalHandler)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(Error::SignalHandler)?;

    tokio::select! {
        _ = sigint.recv() => Ok(Shutdown::SigInt),
        _ = sigterm.recv() => Ok(Shutdown::SigTerm),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    SigInt,
    SigTerm,
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SigInt => f.write_str("SIGINT"),
            Self::SigTerm => f.write_str("SIGTERM"),
        }
    }
}
