use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ValidationError;

/// Phase assigned to a freshly created resource whose hooks did not pick one.
pub const PHASE_PENDING: &str = "Pending";

/// Observed state of a resource.
///
/// The fields are free-form; only `last_transition_time` has a rule attached: it is
/// restamped on every [`ResourceStatus::set`] and never moves backwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_transition_time: Option<OffsetDateTime>,
}

impl ResourceStatus {
    /// Overwrite all status fields and restamp the transition time.
    pub fn set(&mut self, phase: &str, message: &str, reason: &str) {
        phase.clone_into(&mut self.phase);
        message.clone_into(&mut self.message);
        reason.clone_into(&mut self.reason);

        let now = OffsetDateTime::now_utc();
        self.last_transition_time = Some(match self.last_transition_time {
            Some(prev) if prev > now => prev,
            _ => now,
        });
    }
}

/// Identity, versioning and bookkeeping shared by every resource type.
///
/// Embedded by composition and flattened into the resource's JSON representation,
/// so `{"id":1,"kind":"User",...,"username":"alice"}` is a single flat object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Store-assigned primary key. `None` until first persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub resource_version: i64,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub status: ResourceStatus,
}

impl ResourceMetadata {
    /// Metadata carrying only the type information; everything else is server-managed.
    #[must_use]
    pub fn typed(kind: &str, api_version: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            api_version: api_version.to_owned(),
            ..Self::default()
        }
    }

    /// Contract-level validation, independent of any domain fields.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when `kind` or `apiVersion` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kind.is_empty() {
            return Err(ValidationError::required("kind"));
        }
        if self.api_version.is_empty() {
            return Err(ValidationError::required("apiVersion"));
        }
        Ok(())
    }

    pub fn set_type_meta(&mut self, kind: &str, api_version: &str) {
        kind.clone_into(&mut self.kind);
        api_version.clone_into(&mut self.api_version);
    }

    pub fn set_status(&mut self, phase: &str, message: &str, reason: &str) {
        self.status.set(phase, message, reason);
    }

    /// Fill in identity defaults for a resource about to be inserted.
    ///
    /// Existing values are kept: a uid is assigned only when empty, the version only when zero
    /// and the status only when no phase was chosen by a domain hook.
    pub fn init_for_create(&mut self) {
        if self.uid.is_empty() {
            self.uid = Uuid::new_v4().to_string();
        }
        if self.resource_version == 0 {
            self.resource_version = 1;
        }
        if self.status.phase.is_empty() {
            self.set_status(PHASE_PENDING, "Resource is being created", "");
        }
    }

    pub fn bump_version(&mut self) {
        self.resource_version += 1;
    }

    /// Drop every server-managed field a client may have sent along with a new resource.
    pub fn clear_server_fields(&mut self) {
        self.id = None;
        self.uid.clear();
        self.resource_version = 0;
        self.created_at = None;
        self.updated_at = None;
        self.status = ResourceStatus::default();
    }

    /// Replace server-managed fields with the ones of the persisted record.
    pub fn carry_server_fields(&mut self, persisted: &Self) {
        self.id = persisted.id;
        self.uid.clone_from(&persisted.uid);
        self.resource_version = persisted.resource_version;
        self.created_at = persisted.created_at;
        self.updated_at = persisted.updated_at;
        self.status.clone_from(&persisted.status);
    }

    pub fn set_metadata(&mut self, key: &str, value: &str) {
        self.annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.annotations.as_ref()?.get(key).map(String::as_str)
    }

    pub fn delete_metadata(&mut self, key: &str) {
        if let Some(annotations) = self.annotations.as_mut() {
            annotations.remove(key);
        }
    }

    pub fn set_label(&mut self, key: &str, value: &str) {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn get_label(&self, key: &str) -> Option<&str> {
        self.labels.as_ref()?.get(key).map(String::as_str)
    }

    pub fn delete_label(&mut self, key: &str) {
        if let Some(labels) = self.labels.as_mut() {
            labels.remove(key);
        }
    }
}
