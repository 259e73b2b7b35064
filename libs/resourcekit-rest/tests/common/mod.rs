#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use resourcekit_db::{
    ConnectOpts, Dao, LimitCfg, ResourceError, StoredResource, connect_db, map_from_json,
    map_to_json, set_if_some,
};
use resourcekit_meta::{Resource, ResourceMetadata, ResourceStatus, ValidationError};
use resourcekit_rest::register_resource;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

pub const NOTES: &str = "/api/v1/notes";

pub mod note {
    use sea_orm::entity::prelude::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "notes")]
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
        pub title: String,
        pub body: Option<String>,
        pub pinned: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(flatten)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub pinned: bool,
}

impl Resource for Note {
    const KIND: &'static str = "Note";

    fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ResourceMetadata {
        &mut self.metadata
    }

    fn validate_domain(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::required("title"));
        }
        Ok(())
    }

    fn on_create(&mut self) -> Result<(), resourcekit_meta::HookError> {
        self.metadata.set_type_meta("Note", "v1");
        Ok(())
    }

    fn on_update(&mut self) -> Result<(), resourcekit_meta::HookError> {
        self.metadata.set_type_meta("Note", "v1");
        Ok(())
    }
}

impl StoredResource for Note {
    type Entity = note::Entity;
    type Model = note::Model;
    type ActiveModel = note::ActiveModel;

    fn id_column() -> note::Column {
        note::Column::Id
    }

    fn filter_column(field: &str) -> Option<note::Column> {
        match field {
            "title" => Some(note::Column::Title),
            "pinned" => Some(note::Column::Pinned),
            "phase" => Some(note::Column::StatusPhase),
            _ => None,
        }
    }

    fn from_model(m: note::Model) -> Result<Self, ResourceError> {
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
            title: m.title,
            body: m.body,
            pinned: m.pinned,
        })
    }

    fn into_active_model(self) -> note::ActiveModel {
        let meta = self.metadata;
        note::ActiveModel {
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
            title: Set(self.title),
            body: Set(self.body),
            pinned: Set(self.pinned),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub dao: Dao<Note>,
}

pub async fn app() -> TestApp {
    let opts = ConnectOpts {
        max_conns: Some(1),
        min_conns: Some(1),
        ..Default::default()
    };
    let db = connect_db("sqlite::memory:", opts)
        .await
        .expect("Failed to connect to database");
    let dao = Dao::<Note>::new(db, LimitCfg::default());
    dao.auto_migrate().await.expect("migrate");

    let router = register_resource(Router::new(), NOTES, dao.clone());
    TestApp { router, dao }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut req = Request::builder().method(method).uri(uri);
    if body.is_some() {
        req = req.header(http::header::CONTENT_TYPE, "application/json");
    }
    let req = req
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
        .unwrap();

    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn create_note(router: &Router, title: &str) -> i64 {
    let body = serde_json::json!({ "title": title }).to_string();
    let resp = send(router, Method::POST, NOTES, Some(&body)).await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
    resp.body["id"].as_i64().unwrap()
}
