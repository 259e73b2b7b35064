#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Process wiring for `resource-server`: configuration, logging and the HTTP host.

pub mod config;
pub mod logging;
pub mod server;

pub use config::AppConfig;
