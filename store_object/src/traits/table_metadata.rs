//! Trait definitions
//!
//! This module defines the metadata traits generated by `#[model]`.

use crate::errors::StoreError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::postgres::PgRow;
use sqlx::PgConnection;
use std::fmt::Debug;
use std::hash::Hash;
use type_mapping::PostgresValue;

/// A column of one table
///
/// Implemented by the `<Model>Column` enum that `#[model]` generates, so a
/// condition can only name columns that exist on the model.
pub trait ColumnName: Copy + Clone + Debug + PartialEq + Eq + Hash + Send + Sync + 'static {
    /// Unquoted column identifier
    fn as_str(&self) -> &'static str;
}

/// Metadata about database table structure and operations
/// This trait should be derived using the `#[model]` attribute macro, which
/// automatically includes all necessary derives.
///
/// ```ignore
/// use realmstore::prelude::*;
///
/// #[model]
/// #[table(name = "items", reference)]
/// pub struct Item {
///     #[primary_key]
///     #[field(create)]
///     pub id: i32,
///
///     #[field(create, update)]
///     pub name: String,
/// }
/// ```
pub trait TableMetadata:
    Clone
    + Send
    + Sync
    + Debug
    + Unpin
    + Serialize
    + DeserializeOwned
    + for<'r> sqlx::FromRow<'r, PgRow>
    + 'static
{
    /// The type used for the primary key
    type Id: Clone
        + Send
        + Sync
        + Debug
        + Unpin
        + 'static
        + Into<PostgresValue>
        + for<'q> sqlx::Encode<'q, sqlx::Postgres>
        + for<'r> sqlx::Decode<'r, sqlx::Postgres>
        + sqlx::Type<sqlx::Postgres>;

    /// Generated column enumeration
    type Column: ColumnName;

    /// The table name in the database
    fn table_name() -> &'static str;

    /// The primary key field name
    fn primary_key_field() -> &'static str;

    /// The primary key as a column
    fn primary_key_column() -> Self::Column;

    /// Field names written by INSERT
    fn create_fields() -> &'static [&'static str];

    /// Field names an UPDATE may touch
    fn update_fields() -> &'static [&'static str];

    /// INSERT statement binding every create field, returning the primary key
    fn insert_sql() -> &'static str;

    /// `SELECT * FROM table`
    fn select_base_sql() -> &'static str;

    /// `SELECT COUNT(*) FROM table`
    fn count_base_sql() -> &'static str;

    /// SELECT by primary key
    fn get_by_id_sql() -> &'static str;

    /// SELECT by primary key holding a row lock until the transaction ends
    fn lock_by_id_sql() -> &'static str;

    /// DELETE by primary key
    fn delete_by_id_sql() -> &'static str;

    /// Extract ID from model instance
    fn extract_id(&self) -> Self::Id;

    /// Generate CREATE TABLE SQL statement
    fn create_table_sql() -> String;

    /// Generate DROP TABLE SQL statement
    fn drop_table_sql() -> String {
        format!("DROP TABLE IF EXISTS \"{}\"", Self::table_name())
    }

    /// Generate CREATE INDEX SQL statements
    fn create_indexes_sql() -> Vec<String> {
        vec![]
    }

    /// Whether an UPDATE may write this column
    fn is_updatable(column: Self::Column) -> bool {
        Self::update_fields().contains(&column.as_str())
    }
}

/// Database operations whose parameter binding depends on the model's field
/// types, generated alongside `TableMetadata`
#[async_trait]
pub trait DatabaseExecutor: TableMetadata {
    /// Execute the INSERT with every create field bound
    /// Returns the key the database reports for the new row
    async fn execute_insert(&self, conn: &mut PgConnection) -> Result<Option<Self::Id>, StoreError>;
}

/// Rows that belong to a character-like aggregate through a correlation
/// column (field marked `#[aggregate_id]`)
pub trait AggregateOwned: TableMetadata {
    type AggregateId: Clone + Send + Sync + Debug + Into<PostgresValue> + 'static;

    /// The correlation column
    fn aggregate_column() -> Self::Column;

    fn aggregate_id(&self) -> Self::AggregateId;

    /// Stamp the row with its owning aggregate
    fn set_aggregate_id(&mut self, id: Self::AggregateId);
}

/// Read-mostly catalog tables (`#[table(reference)]`)
///
/// Purely a usage convention: reference stores expose the same operations as
/// any other store.
pub trait ReferenceData: TableMetadata {}
