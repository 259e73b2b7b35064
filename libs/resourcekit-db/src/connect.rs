use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};

/// Pool settings for [`connect_db`].
#[derive(Debug, Clone, Default)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    /// Log every SQL statement through `sqlx`.
    pub sqlx_logging: bool,
}

/// Open a pooled connection to `url`.
///
/// In-memory `SQLite` URLs only share one database per connection, so callers using them
/// should cap the pool at a single connection and keep it alive with `min_conns`.
///
/// # Errors
/// Returns [`DbErr`] if the URL is invalid or the first connection cannot be established.
pub async fn connect_db(url: &str, opts: ConnectOpts) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    if let Some(max) = opts.max_conns {
        options.max_connections(max);
    }
    if let Some(min) = opts.min_conns {
        options.min_connections(min);
    }
    if let Some(timeout) = opts.acquire_timeout {
        options.acquire_timeout(timeout);
    }
    options.sqlx_logging(opts.sqlx_logging);

    let db = Database::connect(options).await?;
    tracing::debug!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}
