//! Access-object registry
//!
//! The registry owns the connection pool and hands out one shared
//! `TableStore` per model type, created on first request. It is constructed
//! explicitly and passed around as `Arc<Registry>`; there is no global
//! instance.

use config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use store_object::{
    DatabaseExecutor, ReferenceData, ReferenceStore, StoreError, TableMetadata, TableStore,
    Transaction,
};

type StoreMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Pool owner and lazy cache of table stores
pub struct Registry {
    pool: PgPool,
    stores: RwLock<StoreMap>,
}

impl Registry {
    /// Build the bounded pool described by `config` and connect it
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        config
            .validate()
            .map_err(|e| StoreError::validation(e.to_string()))?;

        let mut pool_options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options
            .connect(&config.connection_string())
            .await
            .map_err(StoreError::Connection)?;

        tracing::info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            stores: RwLock::new(HashMap::new()),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Shared store for `T`; every call for the same model returns the same instance
    /// until [`Registry::clear_cache`]
    pub fn store<T>(&self) -> Arc<TableStore<T>>
    where
        T: TableMetadata + DatabaseExecutor,
    {
        let key = TypeId::of::<TableStore<T>>();

        if let Some(store) = self.read_stores().get(&key).cloned().and_then(downcast::<T>) {
            return store;
        }

        let mut stores = self.write_stores();
        // another caller may have won the race between the two locks
        if let Some(store) = stores.get(&key).cloned().and_then(downcast::<T>) {
            return store;
        }

        store_object::debug_log!("[registry] creating store for {}", T::table_name());
        let store = Arc::new(TableStore::<T>::new(self.pool.clone()));
        stores.insert(key, store.clone());
        store
    }

    /// Store for a reference catalog
    pub fn reference_store<T>(&self) -> Arc<ReferenceStore<T>>
    where
        T: ReferenceData + DatabaseExecutor,
    {
        self.store::<T>()
    }

    /// Number of stores created so far
    pub fn cached_count(&self) -> usize {
        self.read_stores().len()
    }

    /// Drop every cached store; the next request builds a fresh one
    pub fn clear_cache(&self) {
        self.write_stores().clear();
    }

    /// A new, inactive transaction on the shared pool
    pub fn create_transaction(&self) -> Transaction {
        Transaction::new(self.pool.clone())
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Connection)?;
        Ok(())
    }

    // The map only ever holds fully built stores, so a poisoned lock is still usable
    fn read_stores(&self) -> RwLockReadGuard<'_, StoreMap> {
        self.stores.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_stores(&self) -> RwLockWriteGuard<'_, StoreMap> {
        self.stores.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn downcast<T>(store: Arc<dyn Any + Send + Sync>) -> Option<Arc<TableStore<T>>>
where
    T: TableMetadata,
{
    store.downcast::<TableStore<T>>().ok()
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("cached_stores", &self.cached_count())
            .finish()
    }
}
