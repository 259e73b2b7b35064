use serde::{Serialize, de::DeserializeOwned};

use crate::error::{HookError, ValidationError};
use crate::metadata::ResourceMetadata;

/// A typed resource managed by the generic CRUD machinery.
///
/// Implementors embed a [`ResourceMetadata`] and expose it through [`Resource::metadata`].
/// Every hook has a default, so a resource that only needs the contract checks implements
/// the two accessors and nothing else.
///
/// Hooks are never called directly by the store layer; they run through
/// [`crate::lifecycle`], which fixes their ordering relative to the contract defaults.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Display name used in log fields and error messages.
    const KIND: &'static str;

    fn metadata(&self) -> &ResourceMetadata;

    fn metadata_mut(&mut self) -> &mut ResourceMetadata;

    /// Domain-specific validation, run after the contract checks succeeded.
    ///
    /// # Errors
    /// Returns [`ValidationError`] describing the first invalid field.
    fn validate_domain(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Runs before the contract defaults are applied on create.
    ///
    /// # Errors
    /// Returns [`HookError`] to abort the create.
    fn on_create(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs before the version bump on update.
    ///
    /// # Errors
    /// Returns [`HookError`] to abort the update.
    fn on_update(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs before the record is removed.
    ///
    /// # Errors
    /// Returns [`HookError`] to abort the delete.
    fn on_delete(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    /// Copy write-only domain state from the persisted value into a replacement.
    ///
    /// Fields that are never serialized (secrets, hashes) would otherwise be lost when a
    /// client sends a full replacement body.
    fn carry_over(&mut self, _persisted: &Self) {}
}
