//! Aggregate-scoped lookups for tables owned through a correlation column

use super::core::TableStore;
use crate::errors::StoreError;
use crate::query_builder::{Conditions, QueryOptions};
use crate::table_metadata::{AggregateOwned, DatabaseExecutor};
use crate::traits::{AggregateScoped, ColumnOf};
use async_trait::async_trait;
use sqlx::PgConnection;

impl<T> TableStore<T>
where
    T: AggregateOwned + DatabaseExecutor,
{
    /// Conditions selecting every row of one aggregate
    pub fn aggregate_conditions(id: T::AggregateId) -> Conditions<ColumnOf<T>> {
        Conditions::new().eq(T::aggregate_column(), id)
    }

    pub async fn find_by_aggregate_id_on(
        &self,
        conn: &mut PgConnection,
        id: T::AggregateId,
    ) -> Result<Option<T>, StoreError> {
        self.find_one_where_on(conn, &Self::aggregate_conditions(id), &QueryOptions::new())
            .await
    }

    /// Rows in primary-key order
    pub async fn find_all_by_aggregate_id_on(
        &self,
        conn: &mut PgConnection,
        id: T::AggregateId,
    ) -> Result<Vec<T>, StoreError> {
        let options = QueryOptions::new().order_by(T::primary_key_column(), Default::default());
        self.find_where_on(conn, &Self::aggregate_conditions(id), &options)
            .await
    }

    pub async fn delete_by_aggregate_id_on(
        &self,
        conn: &mut PgConnection,
        id: T::AggregateId,
    ) -> Result<u64, StoreError> {
        self.delete_many_on(conn, &Self::aggregate_conditions(id))
            .await
    }

    /// Create a row stamped with the owning aggregate id
    pub async fn create_for_aggregate_on(
        &self,
        conn: &mut PgConnection,
        id: T::AggregateId,
        mut data: T,
    ) -> Result<T, StoreError> {
        data.set_aggregate_id(id);
        self.create_on(conn, &data).await
    }
}

#[async_trait]
impl<T> AggregateScoped for TableStore<T>
where
    T: AggregateOwned + DatabaseExecutor,
{
    type Model = T;

    async fn find_by_aggregate_id(&self, id: T::AggregateId) -> Result<Option<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.find_by_aggregate_id_on(&mut conn, id).await
    }

    async fn find_all_by_aggregate_id(&self, id: T::AggregateId) -> Result<Vec<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.find_all_by_aggregate_id_on(&mut conn, id).await
    }

    async fn delete_by_aggregate_id(&self, id: T::AggregateId) -> Result<u64, StoreError> {
        let mut conn = self.acquire().await?;
        self.delete_by_aggregate_id_on(&mut conn, id).await
    }
}
