//! Traits for database operations
//!
//! This module contains all the traits that define the interface for database operations
//! in the realmstore access layer.

pub mod core;
pub mod table_metadata;

// Re-export all public items for convenience
pub use core::{AggregateScoped, ColumnOf, IdOf, StoreObject};
pub use table_metadata::{AggregateOwned, ColumnName, DatabaseExecutor, ReferenceData, TableMetadata};
