#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use resourcekit_db::{
    ConnectOpts, Dao, LimitCfg, ResourceError, StoredResource, connect_db, map_from_json,
    map_to_json, set_if_some,
};
use resourcekit_meta::{HookError, Resource, ResourceMetadata, ResourceStatus, ValidationError};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

pub mod widget {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "widgets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub uid: String,
        pub kind: String,
        pub api_version: String,
        pub resource_version: i64,
        pub created_at: TimeDateTimeWithTimeZone,
        pub updated_at: TimeDateTimeWithTimeZone,
        pub labels: Option<Json>,
        pub annotations: Option<Json>,
        pub status_phase: String,
        pub status_message: String,
        pub status_reason: String,
        pub status_last_transition_time: Option<TimeDateTimeWithTimeZone>,
        #[sea_orm(unique)]
        pub name: String,
        pub color: Option<String>,
        pub in_stock: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Test resource with a required unique name and a hook that can be told to fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(flatten)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}

pub const BROKEN_COLOR: &str = "broken";

impl Widget {
    pub fn named(name: &str) -> Self {
        Self {
            metadata: ResourceMetadata::typed("Widget", "v1"),
            name: name.to_owned(),
            ..Self::default()
        }
    }
}

impl Resource for Widget {
    const KIND: &'static str = "Widget";

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ResourceMetadata {
        &mut self.metadata
    }

    fn validate_domain(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        Ok(())
    }

    fn on_update(&mut self) -> Result<(), HookError> {
        if self.color.as_deref() == Some(BROKEN_COLOR) {
            return Err(HookError::internal("paint shop on fire"));
        }
        Ok(())
    }
}

impl StoredResource for Widget {
    type Entity = widget::Entity;
    type Model = widget::Model;
    type ActiveModel = widget::ActiveModel;

    fn id_column() -> widget::Column {
        widget::Column::Id
    }

    fn filter_column(field: &str) -> Option<widget::Column> {
        match field {
            "id" => Some(widget::Column::Id),
            "name" => Some(widget::Column::Name),
            "color" => Some(widget::Column::Color),
            "inStock" => Some(widget::Column::InStock),
            "resourceVersion" => Some(widget::Column::ResourceVersion),
            _ => None,
        }
    }

    fn from_model(m: widget::Model) -> Result<Self, ResourceError> {
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
            name: m.name,
            color: m.color,
            in_stock: m.in_stock,
        })
    }

    fn into_active_model(self) -> widget::ActiveModel {
        let meta = self.metadata;
        widget::ActiveModel {
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
            name: Set(self.name),
            color: Set(self.color),
            in_stock: Set(self.in_stock),
        }
    }
}

pub async fn setup() -> Dao<Widget> {
    setup_with(LimitCfg::default()).await
}

pub async fn setup_with(limits: LimitCfg) -> Dao<Widget> {
    let opts = ConnectOpts {
        max_conns: Some(1),
        min_conns: Some(1),
        ..Default::default()
    };
    let db = connect_db("sqlite::memory:", opts)
        .await
        .expect("Failed to connect to database");
    let dao = Dao::new(db, limits);
    dao.auto_migrate().await.expect("migrate");
    dao
}
