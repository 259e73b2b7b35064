use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use crate::error::ResourceError;

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Run `f` inside a transaction.
///
/// Commits when `f` succeeds. When `f` fails every write it made is rolled back and its
/// error is returned unchanged.
///
/// # Errors
/// Returns the error of `f`, or a store error if the transaction cannot be opened or
/// committed.
pub async fn with_transaction<T, E, F>(db: &DatabaseConnection, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T, E> + Send,
    T: Send,
    E: From<DbErr> + Send,
{
    let txn = db.begin().await?;
    match f(&txn).await {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            rollback(txn).await;
            Err(err)
        }
    }
}

/// Commit `txn` on success, roll it back on failure.
pub(crate) async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, ResourceError>,
) -> Result<T, ResourceError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            rollback(txn).await;
            Err(err)
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        tracing::warn!(error = %e, "transaction rollback failed");
    }
}
