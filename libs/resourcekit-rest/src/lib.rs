#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Generic REST surface for stored resources.

pub mod error;
pub mod handlers;
pub mod module;
pub mod patch;
pub mod problem;
pub mod query;
pub mod routes;

pub use error::resource_error_to_problem;
pub use handlers::{ResourceState, parse_id};
pub use module::ResourceModule;
pub use problem::{ApiResult, PROBLEM_CONTENT_TYPE, Problem};
pub use routes::register_resource;
