#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Metadata contract shared by every resource type: identity, versioning, status,
//! annotations and the lifecycle hook ordering.

pub mod error;
pub mod lifecycle;
pub mod metadata;
pub mod resource;

pub use error::{HookError, ValidationError};
pub use metadata::{PHASE_PENDING, ResourceMetadata, ResourceStatus};
pub use resource::Resource;
