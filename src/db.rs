use std::{future::Future, pin::Pin};

use anyhow::Result;
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionError,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::{
    error::{StoreError, StoreResult},
    migration::Migrator,
};

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    // Every connection to `sqlite::memory:` opens its own empty database.
    if database_url.contains(":memory:") {
        options.max_connections(1);
    }
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply all pending schema migrations.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}

/// Runs `op` inside one transaction: commit on `Ok`, rollback on `Err`.
pub async fn in_transaction<F, T>(conn: &DatabaseConnection, op: F) -> StoreResult<T>
where
    F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        ) -> Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'c>>
        + Send,
    T: Send,
{
    conn.transaction::<F, T, StoreError>(op)
        .await
        .map_err(|err| match err {
            TransactionError::Connection(db_err) => StoreError::from(db_err),
            TransactionError::Transaction(store_err) => {
                tracing::debug!(error = %store_err, "transaction rolled back");
                store_err
            }
        })
}
