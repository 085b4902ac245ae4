//! Explicit transactions
//!
//! A `Transaction` owns at most one pooled connection with an open database
//! transaction. Stores take part through their `_on` methods, fed with
//! `connection()`.
//!
//! # Example
//! ```ignore
//! let mut tx = registry.create_transaction();
//! let wallets = registry.store::<CharacterWallet>();
//!
//! tx.execute(move |conn| {
//!     Box::pin(async move {
//!         wallets.update_many_on(conn, &conditions, diff).await
//!     })
//! })
//! .await?;
//! ```

use crate::errors::StoreError;
use crate::DbPool;
use futures::future::BoxFuture;
use sqlx::{PgConnection, Postgres};

/// Isolation level applied right after BEGIN
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn to_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Inactive until `begin`, active until `commit` or `rollback`
///
/// Dropping an active transaction rolls it back and returns the connection
/// to the pool.
pub struct Transaction {
    pool: DbPool,
    inner: Option<sqlx::Transaction<'static, Postgres>>,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Transaction {
    pub fn new(pool: DbPool) -> Self {
        Self { pool, inner: None }
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Acquire a connection and issue BEGIN
    pub async fn begin(&mut self) -> Result<(), StoreError> {
        if self.inner.is_some() {
            return Err(StoreError::TransactionAlreadyActive);
        }
        let tx = self.pool.begin().await.map_err(StoreError::Connection)?;
        self.inner = Some(tx);
        crate::trace_log!("transaction started");
        Ok(())
    }

    pub async fn begin_with(&mut self, isolation: IsolationLevel) -> Result<(), StoreError> {
        self.begin().await?;
        let applied = match self.inner.as_deref_mut() {
            Some(conn) => sqlx::query(isolation.to_sql())
                .execute(conn)
                .await
                .map(|_| ())
                .map_err(|e| StoreError::database("transaction", "set_isolation", e)),
            None => Err(StoreError::TransactionNotActive),
        };
        if let Err(err) = applied {
            self.release_after_failure().await;
            return Err(err);
        }
        Ok(())
    }

    /// The connection the transaction runs on
    pub fn connection(&mut self) -> Result<&mut PgConnection, StoreError> {
        self.inner
            .as_deref_mut()
            .ok_or(StoreError::TransactionNotActive)
    }

    /// COMMIT; the connection goes back to the pool whatever the outcome
    pub async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self.inner.take().ok_or(StoreError::TransactionNotActive)?;
        tx.commit()
            .await
            .map_err(|e| StoreError::database("transaction", "commit", e))?;
        crate::trace_log!("transaction committed");
        Ok(())
    }

    /// ROLLBACK; the connection goes back to the pool whatever the outcome
    pub async fn rollback(&mut self) -> Result<(), StoreError> {
        let tx = self.inner.take().ok_or(StoreError::TransactionNotActive)?;
        tx.rollback()
            .await
            .map_err(|e| StoreError::database("transaction", "rollback", e))?;
        crate::trace_log!("transaction rolled back");
        Ok(())
    }

    /// Run `operation` between BEGIN and COMMIT
    ///
    /// When `operation` fails the transaction is rolled back and the
    /// operation's own error is returned; a failing rollback is only logged.
    pub async fn execute<R, E, F>(&mut self, operation: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<R, E>> + Send,
        E: From<StoreError>,
    {
        self.begin().await?;
        self.run(operation).await
    }

    pub async fn execute_with<R, E, F>(
        &mut self,
        isolation: IsolationLevel,
        operation: F,
    ) -> Result<R, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<R, E>> + Send,
        E: From<StoreError>,
    {
        self.begin_with(isolation).await?;
        self.run(operation).await
    }

    async fn run<R, E, F>(&mut self, operation: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<R, E>> + Send,
        E: From<StoreError>,
    {
        let outcome = match self.connection() {
            Ok(conn) => operation(conn).await,
            Err(err) => Err(err.into()),
        };

        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                self.release_after_failure().await;
                Err(err)
            }
        }
    }

    async fn release_after_failure(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Err(rollback_err) = self.rollback().await {
            tracing::error!(error = %rollback_err, "Rollback failed after a failed operation");
        }
    }
}
