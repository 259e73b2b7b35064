//! Ordering of contract defaults and domain hooks.
//!
//! | stage           | order                                                  |
//! |-----------------|--------------------------------------------------------|
//! | `before_create` | `on_create` -> uid/version/status defaults -> validate |
//! | `before_update` | `on_update` -> version + 1 -> validate                 |
//! | `before_delete` | `on_delete`                                            |
//!
//! Each stage mutates the value in place. Callers own the value, so a failed stage leaves
//! nothing behind once the value is dropped.

use crate::error::{HookError, ValidationError};
use crate::resource::Resource;

/// Contract checks first, then domain checks.
///
/// # Errors
/// Returns the first [`ValidationError`] found.
pub fn validate<R: Resource>(resource: &R) -> Result<(), ValidationError> {
    resource.metadata().validate()?;
    resource.validate_domain()
}

/// # Errors
/// Returns [`HookError`] when the domain hook fails or the result does not validate.
pub fn before_create<R: Resource>(resource: &mut R) -> Result<(), HookError> {
    resource.on_create()?;
    resource.metadata_mut().init_for_create();
    validate(resource)?;
    Ok(())
}

/// # Errors
/// Returns [`HookError`] when the domain hook fails or the result does not validate.
pub fn before_update<R: Resource>(resource: &mut R) -> Result<(), HookError> {
    resource.on_update()?;
    resource.metadata_mut().bump_version();
    validate(resource)?;
    Ok(())
}

/// # Errors
/// Returns [`HookError`] when the domain hook fails.
pub fn before_delete<R: Resource>(resource: &mut R) -> Result<(), HookError> {
    resource.on_delete()
}
