use futures::future::BoxFuture;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::AppError;

/// Run a closure inside a transaction, committing on `Ok` and rolling back on `Err`.
///
/// Every lifecycle transition goes through here so that the status change,
/// its side rows, and the outbox entries land together or not at all.
pub async fn run_in_transaction<T, F>(pool: &SqlitePool, f: F) -> Result<T, AppError>
where
    F: for<'c> FnOnce(&'c mut Transaction<'_, Sqlite>) -> BoxFuture<'c, Result<T, AppError>>,
    T: Send,
{
    let mut tx = pool.begin().await.map_err(AppError::from)?;

    match f(&mut tx).await {
        Ok(value) => {
            tx.commit().await.map_err(AppError::from)?;
            Ok(value)
        }
        Err(err) => {
            log::warn!("Transaction failed with error: {}, rolling back", err);
            if let Err(rollback_err) = tx.rollback().await {
                log::error!(
                    "Rollback failed after error (orig: {}, rollback: {})",
                    err,
                    rollback_err
                );
            }
            Err(err)
        }
    }
}
