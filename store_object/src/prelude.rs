//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{
    AggregateOwned, AggregateScoped, ColumnName, DatabaseExecutor, ReferenceData, StoreObject,
    TableMetadata,
};

// Error types
pub use crate::errors::StoreError;

// Core store functionality
pub use crate::generic_store::{IsolationLevel, ReferenceStore, TableStore, Transaction};

// Query building
pub use crate::query_builder::{Conditions, Page, QueryOptions, SortOrder, UpdateSet};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use futures::future::BoxFuture;
pub use serde::{Deserialize, Serialize};
pub use sqlx::{FromRow, PgConnection, PgPool};
