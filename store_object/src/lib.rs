//! Store Object - Core database abstraction layer for realmstore
//!
//! This crate provides the foundational types and traits for database operations:
//! table-bound stores, the typed clause builder and explicit transactions.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod generic_store;
pub mod prelude;
pub mod query_builder;
pub mod traits;

pub use errors::StoreError;
pub use generic_store::{IsolationLevel, ReferenceStore, TableStore, Transaction};
pub use query_builder::{
    Conditions, Page, Predicate, QueryOperator, QueryOptions, SortOrder, UpdateOperation,
    UpdateSet,
};
pub use traits::table_metadata;
pub use traits::*;
pub use type_mapping::PostgresValue;

use sqlx::PgPool;

pub type DbPool = PgPool;
