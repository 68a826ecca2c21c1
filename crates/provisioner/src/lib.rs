#![forbid(unsafe_code)]

//! Provisions pre-split HBase tables sized from an S3 export inventory.
//!
//! A run lists the export objects under the configured prefixes, totals
//! their sizes per canonical collection, shares the cluster's region
//! budget out proportionally and creates one table per collection with
//! evenly spaced split keys.

pub mod allocation;
pub mod clock;
pub mod cluster;
pub mod domain;
mod engine;
mod error;
pub mod inventory;
pub mod naming;
pub mod scheduler;

pub use engine::{InventoryExpectation, Provisioner, RunReport, Services};
pub use error::Error;
