use crate::table_metadata::TableMetadata;
use crate::DbPool;

/// Generic database store bound to the table of `T`
///
/// Pooled operations come from the `StoreObject` trait. Each one has an
/// `_on` counterpart taking a borrowed connection, which is how the store
/// takes part in a `Transaction`.
pub struct TableStore<T: TableMetadata> {
    pub(crate) db_pool: DbPool,
    pub(crate) _phantom: std::marker::PhantomData<T>,
}

/// Store over a catalog table; same operations, read-mostly by convention
pub type ReferenceStore<T> = TableStore<T>;

impl<T: TableMetadata> Clone for TableStore<T> {
    fn clone(&self) -> Self {
        Self {
            db_pool: self.db_pool.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: TableMetadata> std::fmt::Debug for TableStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("table", &T::table_name())
            .field("primary_key", &T::primary_key_field())
            .finish()
    }
}

impl<T: TableMetadata> TableStore<T> {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }

    pub fn table_name(&self) -> &'static str {
        T::table_name()
    }
}
