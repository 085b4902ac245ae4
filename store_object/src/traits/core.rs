//! Trait definitions
//!
//! This module defines core traits for database operations.

use crate::errors::StoreError;
use crate::query_builder::{Conditions, Page, QueryOptions, UpdateSet};
use crate::traits::table_metadata::{AggregateOwned, TableMetadata};
use async_trait::async_trait;

/// Column enumeration of a model
pub type ColumnOf<T> = <T as TableMetadata>::Column;

/// Primary key type of a model
pub type IdOf<T> = <T as TableMetadata>::Id;

/// Pooled CRUD operations of an access object
///
/// Every call acquires one pooled connection and runs in autocommit mode.
/// "Not found" is reported through `Option`, `bool` and row counts.
#[async_trait]
pub trait StoreObject: Send + Sync {
    /// The model type that this object represents
    type Model: TableMetadata;

    /// Get a row by its primary key
    async fn find_by_id(&self, id: &IdOf<Self::Model>) -> Result<Option<Self::Model>, StoreError>;

    /// List rows with optional ordering and window
    async fn find_all(
        &self,
        options: QueryOptions<ColumnOf<Self::Model>>,
    ) -> Result<Vec<Self::Model>, StoreError>;

    /// Find rows matching every condition
    async fn find_where(
        &self,
        conditions: Conditions<ColumnOf<Self::Model>>,
        options: QueryOptions<ColumnOf<Self::Model>>,
    ) -> Result<Vec<Self::Model>, StoreError>;

    /// Find the first row matching every condition
    async fn find_one_where(
        &self,
        conditions: Conditions<ColumnOf<Self::Model>>,
        options: QueryOptions<ColumnOf<Self::Model>>,
    ) -> Result<Option<Self::Model>, StoreError>;

    /// Read one 1-based page of the table
    async fn find_paginated(
        &self,
        page: i64,
        page_size: i64,
        options: QueryOptions<ColumnOf<Self::Model>>,
    ) -> Result<Page<Self::Model>, StoreError>;

    /// Read one 1-based page of the rows matching every condition
    async fn find_paginated_where(
        &self,
        conditions: Conditions<ColumnOf<Self::Model>>,
        page: i64,
        page_size: i64,
        options: QueryOptions<ColumnOf<Self::Model>>,
    ) -> Result<Page<Self::Model>, StoreError>;

    /// Insert a row and return it as stored
    async fn create(&self, data: Self::Model) -> Result<Self::Model, StoreError>;

    /// Insert rows in one transaction; any failure inserts none of them
    async fn create_many(&self, items: Vec<Self::Model>) -> Result<Vec<Self::Model>, StoreError>;

    /// Apply `diff` to one row; an empty diff returns the current row unchanged
    async fn update(
        &self,
        id: &IdOf<Self::Model>,
        diff: UpdateSet<ColumnOf<Self::Model>>,
    ) -> Result<Option<Self::Model>, StoreError>;

    /// Apply `diff` to every matching row and return the affected count
    async fn update_many(
        &self,
        conditions: Conditions<ColumnOf<Self::Model>>,
        diff: UpdateSet<ColumnOf<Self::Model>>,
    ) -> Result<u64, StoreError>;

    /// Delete a row by its primary key
    async fn delete(&self, id: &IdOf<Self::Model>) -> Result<bool, StoreError>;

    /// Delete every matching row and return the affected count
    async fn delete_many(
        &self,
        conditions: Conditions<ColumnOf<Self::Model>>,
    ) -> Result<u64, StoreError>;

    /// Count rows matching every condition
    async fn count(&self, conditions: Conditions<ColumnOf<Self::Model>>) -> Result<i64, StoreError>;

    async fn exists(&self, conditions: Conditions<ColumnOf<Self::Model>>) -> Result<bool, StoreError> {
        Ok(self.count(conditions).await? > 0)
    }
}

/// Lookups through the aggregate correlation column
#[async_trait]
pub trait AggregateScoped: Send + Sync {
    type Model: AggregateOwned;

    /// The single row owned by the aggregate, for 1:1 satellite tables
    async fn find_by_aggregate_id(
        &self,
        id: <Self::Model as AggregateOwned>::AggregateId,
    ) -> Result<Option<Self::Model>, StoreError>;

    /// Every row owned by the aggregate, for 1:n tables
    async fn find_all_by_aggregate_id(
        &self,
        id: <Self::Model as AggregateOwned>::AggregateId,
    ) -> Result<Vec<Self::Model>, StoreError>;

    async fn delete_by_aggregate_id(
        &self,
        id: <Self::Model as AggregateOwned>::AggregateId,
    ) -> Result<u64, StoreError>;
}
