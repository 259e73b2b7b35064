use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use axum::Router;
use resourcekit_db::{Dao, LimitCfg};
use resourcekit_rest::{ResourceModule, register_resource};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::domain::user::User;

pub const BASE_PATH: &str = "/api/v1/users";

/// Serves [`User`] under [`BASE_PATH`].
pub struct UsersModule {
    dao: ArcSwapOption<Dao<User>>,
}

impl Default for UsersModule {
    fn default() -> Self {
        Self {
            dao: ArcSwapOption::from(None),
        }
    }
}

impl UsersModule {
    /// The DAO created by [`ResourceModule::init`], if the module has been initialized.
    #[must_use]
    pub fn dao(&self) -> Option<Arc<Dao<User>>> {
        self.dao.load_full()
    }
}

#[async_trait]
impl ResourceModule for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, db: &DatabaseConnection, limits: LimitCfg) -> anyhow::Result<()> {
        info!("Initializing users module");

        let dao = Dao::<User>::new(db.clone(), limits);
        dao.auto_migrate()
            .await
            .map_err(|e| anyhow::anyhow!("failed to migrate users table: {e}"))?;

        self.dao.store(Some(Arc::new(dao)));
        info!("Users module initialized");
        Ok(())
    }

    fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        let dao = self
            .dao()
            .ok_or_else(|| anyhow::anyhow!("users module not initialized"))?;

        Ok(register_resource(router, BASE_PATH, (*dao).clone()))
    }
}
