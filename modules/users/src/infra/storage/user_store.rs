use resourcekit_db::{ResourceError, StoredResource, map_from_json, map_to_json, set_if_some};
use resourcekit_meta::{ResourceMetadata, ResourceStatus};
use sea_orm::ActiveValue::Set;

use crate::domain::user::User;
use crate::infra::storage::entity::user::{ActiveModel, Column, Entity, Model};

impl StoredResource for User {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    fn id_column() -> Column {
        Column::Id
    }

    fn filter_column(field: &str) -> Option<Column> {
        match field {
            "id" => Some(Column::Id),
            "uid" => Some(Column::Uid),
            "kind" => Some(Column::Kind),
            "apiVersion" => Some(Column::ApiVersion),
            "resourceVersion" => Some(Column::ResourceVersion),
            "phase" => Some(Column::StatusPhase),
            "username" => Some(Column::Username),
            "email" => Some(Column::Email),
            "fullName" => Some(Column::FullName),
            "isActive" => Some(Column::IsActive),
            _ => None,
        }
    }

    fn from_model(m: Model) -> Result<Self, ResourceError> {
        Ok(Self {
            metadata: ResourceMetadata {
                id: Some(m.id),
                uid: m.uid,
                kind: m.kind,
                api_version: m.api_version,
                resource_version: m.resource_version,
                created_at: Some(m.created_at),
                updated_at: Some(m.updated_at),
                labels: map_from_json("labels", m.labels)?,
                annotations: map_from_json("annotations", m.annotations)?,
                status: ResourceStatus {
                    phase: m.status_phase,
                    message: m.status_message,
                    reason: m.status_reason,
                    last_transition_time: m.status_last_transition_time,
                },
            },
            username: m.username,
            email: m.email,
            password: m.password,
            full_name: m.full_name,
            is_active: m.is_active,
        })
    }

    fn into_active_model(self) -> ActiveModel {
        let meta = self.metadata;
        ActiveModel {
            id: set_if_some(meta.id),
            uid: Set(meta.uid),
            kind: Set(meta.kind),
            api_version: Set(meta.api_version),
            resource_version: Set(meta.resource_version),
            created_at: set_if_some(meta.created_at),
            updated_at: set_if_some(meta.updated_at),
            labels: Set(map_to_json(meta.labels.as_ref())),
            annotations: Set(map_to_json(meta.annotations.as_ref())),
            status_phase: Set(meta.status.phase),
            status_message: Set(meta.status.message),
            status_reason: Set(meta.status.reason),
            status_last_transition_time: Set(meta.status.last_transition_time),
            username: Set(self.username),
            email: Set(self.email),
            password: Set(self.password),
            full_name: Set(self.full_name),
            is_active: Set(self.is_active),
        }
    }
}
