#![forbid(unsafe_code)]

mod planner;
mod splits;

pub use planner::RegionPlanner;
pub use splits::{split_plan, splits};
