use std::collections::BTreeMap;

use resourcekit_meta::Resource;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, FromQueryResult, IntoActiveModel, Value};
use serde_json::Value as Json;

use crate::error::ResourceError;

/// Binds a [`Resource`] to the `SeaORM` entity that stores it.
///
/// The entity must carry an `i64` auto-increment primary key and one column per metadata
/// field; the `users` module shows the full column set.
pub trait StoredResource: Resource {
    type Entity: EntityTrait<Model = Self::Model> + Default;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;

    fn id_column() -> <Self::Entity as EntityTrait>::Column;

    /// Resolve a JSON field name used in list filters to its column.
    ///
    /// Fields not returned here cannot be filtered on.
    fn filter_column(field: &str) -> Option<<Self::Entity as EntityTrait>::Column>;

    /// # Errors
    /// Returns [`ResourceError::Internal`] when a stored value cannot be decoded.
    fn from_model(model: Self::Model) -> Result<Self, ResourceError>;

    fn into_active_model(self) -> Self::ActiveModel;
}

/// `Set` for known values, `NotSet` otherwise, so the store fills in ids it assigns.
#[must_use]
pub fn set_if_some<V: Into<Value>>(value: Option<V>) -> ActiveValue<V> {
    match value {
        Some(v) => ActiveValue::Set(v),
        None => ActiveValue::NotSet,
    }
}

/// Encode labels or annotations for a JSON column.
#[must_use]
pub fn map_to_json(map: Option<&BTreeMap<String, String>>) -> Option<Json> {
    map.map(|m| {
        Json::Object(
            m.iter()
                .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                .collect(),
        )
    })
}

/// Decode labels or annotations from a JSON column.
///
/// # Errors
/// Returns [`ResourceError::Internal`] when the column holds anything but a string map.
pub fn map_from_json(
    column: &str,
    value: Option<Json>,
) -> Result<Option<BTreeMap<String, String>>, ResourceError> {
    match value {
        None | Some(Json::Null) => Ok(None),
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| ResourceError::internal(format!("corrupt {column} column: {e}"))),
    }
}
