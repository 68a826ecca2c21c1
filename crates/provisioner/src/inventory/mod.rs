#![forbid(unsafe_code)]

mod aggregator;
mod lister;
mod retry;
mod store;

pub use aggregator::{InventoryAggregator, KeyFilter, KeyMatch};
pub use lister::{ListError, ListPage, ListRequest, ObjectLister, ObjectSummary};
pub use retry::with_backoff;
pub use store::ObjectStoreLister;
