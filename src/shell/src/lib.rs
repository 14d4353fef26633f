//! Native shell for the EPD clock configuration core
//!
//! Executes the core's HTTP effects against a device over the network and
//! drives its timers from tokio tasks.

pub mod cli;
pub mod config;
pub mod http_client;
pub mod render;
pub mod shell;
