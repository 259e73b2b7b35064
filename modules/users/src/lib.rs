#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! The `User` resource and the module that serves it.

pub mod domain;
pub mod infra;
pub mod module;

pub use domain::user::User;
pub use module::{BASE_PATH, UsersModule};
