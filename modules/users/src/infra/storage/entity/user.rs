use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uid: String,
    pub kind: String,
    pub api_version: String,
    pub resource_version: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub labels: Option<Json>,
    pub annotations: Option<Json>,
    pub status_phase: String,
    pub status_message: String,
    pub status_reason: String,
    pub status_last_transition_time: Option<OffsetDateTime>,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// `DeriveEntityModel` does not derive `PartialEq` on the generated `Column`
// enum; tests compare columns, so provide the derive-equivalent impl.
#[cfg(test)]
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
