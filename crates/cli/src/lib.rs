#![forbid(unsafe_code)]

pub mod cli;
mod error;
pub mod signals;
pub mod store;

pub use error::Error;
