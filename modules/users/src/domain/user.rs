use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use resourcekit_meta::{HookError, Resource, ResourceMetadata, ValidationError};
use serde::{Deserialize, Serialize};

use crate::domain::password;

pub const KIND: &str = "User";
pub const API_VERSION: &str = "v1";

pub const PHASE_ACTIVE: &str = "Active";
pub const PHASE_DELETED: &str = "Deleted";

const MIN_USERNAME_LEN: usize = 3;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex pattern")
});

/// An account.
///
/// `password` is write-only: it is accepted in request bodies, stored as a bcrypt hash and
/// never serialized back.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Default for User {
    fn default() -> Self {
        Self {
            metadata: ResourceMetadata::default(),
            username: String::new(),
            email: String::new(),
            password: String::new(),
            full_name: None,
            is_active: default_active(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("metadata", &self.metadata)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("is_active", &self.is_active)
            .finish()
    }
}

impl User {
    #[must_use]
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            ..Self::default()
        }
    }

    /// Check a plaintext candidate against the stored hash.
    #[must_use]
    pub fn check_password(&self, candidate: &str) -> bool {
        password::verify(candidate, &self.password)
    }

    fn stamp(&mut self, phase: &str, message: &str, reason: &str) {
        self.metadata.set_type_meta(KIND, API_VERSION);
        self.metadata.set_status(phase, message, reason);
    }

    fn hash_password(&mut self) -> Result<(), HookError> {
        if !self.password.is_empty() && !password::is_hashed(&self.password) {
            self.password = password::hash(&self.password)?;
        }
        Ok(())
    }
}

impl Resource for User {
    const KIND: &'static str = KIND;

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ResourceMetadata {
        &mut self.metadata
    }

    fn validate_domain(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::required("username"));
        }
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Err(ValidationError::new(
                "username",
                format!("username must be at least {MIN_USERNAME_LEN} characters long"),
            ));
        }
        if self.email.is_empty() {
            return Err(ValidationError::required("email"));
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::new("email", "invalid email format"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::required("password"));
        }
        Ok(())
    }

    fn on_create(&mut self) -> Result<(), HookError> {
        self.stamp(PHASE_ACTIVE, "User created successfully", "Created");
        self.hash_password()
    }

    fn on_update(&mut self) -> Result<(), HookError> {
        self.stamp(PHASE_ACTIVE, "User updated successfully", "Updated");
        self.hash_password()
    }

    fn on_delete(&mut self) -> Result<(), HookError> {
        self.metadata
            .set_status(PHASE_DELETED, "User deleted successfully", "Deleted");
        Ok(())
    }

    fn carry_over(&mut self, persisted: &Self) {
        if self.password.is_empty() {
            self.password.clone_from(&persisted.password);
        }
    }
}
