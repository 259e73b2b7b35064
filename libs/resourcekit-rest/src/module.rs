use async_trait::async_trait;
use axum::Router;
use resourcekit_db::LimitCfg;
use sea_orm::DatabaseConnection;

/// A unit that owns one or more resource types and exposes them over REST.
///
/// The server calls [`ResourceModule::init`] on every module before any route is
/// registered, then folds the modules' routes into a single router.
#[async_trait]
pub trait ResourceModule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Prepare storage (schema migration) and internal services.
    ///
    /// # Errors
    /// Returns an error if the module cannot reach or migrate its storage.
    async fn init(&self, db: &DatabaseConnection, limits: LimitCfg) -> anyhow::Result<()>;

    /// Add the module's routes to `router`.
    ///
    /// # Errors
    /// Returns an error if called before [`ResourceModule::init`].
    fn register_rest(&self, router: Router) -> anyhow::Result<Router>;
}
