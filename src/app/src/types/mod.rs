//! Domain-based type organization
//!
//! Types are organized by domain to match the structure in `update/`:
//! - config: Device configuration record and form state
//! - dashboard: Log tail and reachability state
//! - wifi: Access point scan results and selector
//! - common: Status line and shared helpers

pub mod common;
pub mod config;
pub mod dashboard;
pub mod wifi;

pub use common::*;
pub use config::*;
pub use dashboard::*;
pub use wifi::*;
