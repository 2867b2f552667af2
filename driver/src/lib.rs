//! Async driver that paces a search and streams its events.

mod config;
mod scheduler;

pub use config::DriverConfig;
pub use scheduler::{BatchScheduler, SearchEvent, SearchHandle};
