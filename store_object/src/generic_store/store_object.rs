//! Generic store implementations
//!
//! Statement logic lives in the connection-scoped `_on` methods; the pooled
//! `StoreObject` methods acquire a connection and delegate to them.

use super::core::TableStore;
use crate::errors::StoreError;
use crate::query_builder::pagination::page_offset;
use crate::query_builder::{Conditions, Page, QueryOptions, SortOrder, SqlGenerator, UpdateSet};
use crate::table_metadata::{DatabaseExecutor, TableMetadata};
use crate::traits::{ColumnOf, StoreObject};
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::{PgConnection, Postgres};
use type_mapping::PostgresValue;

// Bind one value with its own SQL type, NULLs included
macro_rules! bind_value {
    ($query:expr, $value:expr) => {
        match $value {
            PostgresValue::Text(v) => $query.bind(v),
            PostgresValue::SmallInt(v) => $query.bind(v),
            PostgresValue::Integer(v) => $query.bind(v),
            PostgresValue::BigInt(v) => $query.bind(v),
            PostgresValue::Double(v) => $query.bind(v),
            PostgresValue::Boolean(v) => $query.bind(v),
            PostgresValue::Uuid(v) => $query.bind(v),
            PostgresValue::Timestamp(v) => $query.bind(v),
        }
    };
}

fn bind_rows<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: Vec<PostgresValue>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = bind_value!(query, value);
    }
    query
}

fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    values: Vec<PostgresValue>,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in values {
        query = bind_value!(query, value);
    }
    query
}

fn bind_raw<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    values: Vec<PostgresValue>,
) -> Query<'q, Postgres, PgArguments> {
    for value in values {
        query = bind_value!(query, value);
    }
    query
}

impl<T> TableStore<T>
where
    T: TableMetadata + DatabaseExecutor,
{
    pub(crate) async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        self.db_pool.acquire().await.map_err(StoreError::Connection)
    }

    /// Build `SELECT * ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
    pub(crate) fn select_statement(
        conditions: &Conditions<ColumnOf<T>>,
        options: &QueryOptions<ColumnOf<T>>,
    ) -> (String, Vec<PostgresValue>) {
        let (where_clause, mut params) = SqlGenerator::build_where_clause(conditions, 1);
        let order_clause = SqlGenerator::build_order_clause(options);
        let (limit_clause, limit_params) =
            SqlGenerator::build_limit_clause(options, params.len() + 1);
        params.extend(limit_params);

        let sql = SqlGenerator::assemble(&[
            T::select_base_sql(),
            &where_clause,
            &order_clause,
            &limit_clause,
        ]);
        (sql, params)
    }

    /// Build `UPDATE ... SET ... WHERE ...`; SET parameters come first
    pub(crate) fn update_statement(
        diff: &UpdateSet<ColumnOf<T>>,
        conditions: &Conditions<ColumnOf<T>>,
    ) -> (String, Vec<PostgresValue>) {
        let (set_clause, mut params) = SqlGenerator::build_set_clause(diff, 1);
        let (where_clause, where_params) =
            SqlGenerator::build_where_clause(conditions, params.len() + 1);
        params.extend(where_params);

        let head = format!("UPDATE \"{}\" SET {}", T::table_name(), set_clause);
        (SqlGenerator::assemble(&[&head, &where_clause]), params)
    }

    pub async fn find_by_id_on(
        &self,
        conn: &mut PgConnection,
        id: &T::Id,
    ) -> Result<Option<T>, StoreError> {
        trace_log!("[{}] find_by_id {:?}", T::table_name(), id);
        sqlx::query_as::<_, T>(T::get_by_id_sql())
            .bind(id.clone())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "find_by_id", e))
    }

    /// Read a row and hold `FOR UPDATE` on it until the surrounding
    /// transaction ends
    pub async fn lock_by_id_on(
        &self,
        conn: &mut PgConnection,
        id: &T::Id,
    ) -> Result<Option<T>, StoreError> {
        trace_log!("[{}] lock_by_id {:?}", T::table_name(), id);
        sqlx::query_as::<_, T>(T::lock_by_id_sql())
            .bind(id.clone())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "lock_by_id", e))
    }

    pub async fn find_where_on(
        &self,
        conn: &mut PgConnection,
        conditions: &Conditions<ColumnOf<T>>,
        options: &QueryOptions<ColumnOf<T>>,
    ) -> Result<Vec<T>, StoreError> {
        let (sql, params) = Self::select_statement(conditions, options);
        debug_log!("[{}] find_where: {} ({} params)", T::table_name(), sql, params.len());

        bind_rows(sqlx::query_as::<_, T>(&sql), params)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "find_where", e))
    }

    pub async fn find_one_where_on(
        &self,
        conn: &mut PgConnection,
        conditions: &Conditions<ColumnOf<T>>,
        options: &QueryOptions<ColumnOf<T>>,
    ) -> Result<Option<T>, StoreError> {
        let options = options.limit(1);
        let mut rows = self.find_where_on(conn, conditions, &options).await?;
        Ok(rows.pop())
    }

    pub async fn count_on(
        &self,
        conn: &mut PgConnection,
        conditions: &Conditions<ColumnOf<T>>,
    ) -> Result<i64, StoreError> {
        let (where_clause, params) = SqlGenerator::build_where_clause(conditions, 1);
        let sql = SqlGenerator::assemble(&[T::count_base_sql(), &where_clause]);
        debug_log!("[{}] count: {}", T::table_name(), sql);

        bind_scalar(sqlx::query_scalar::<_, i64>(&sql), params)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "count", e))
    }

    /// COUNT followed by the page read on the same connection. The two
    /// statements do not share a snapshot unless the caller runs them inside
    /// a repeatable-read transaction.
    pub async fn find_paginated_on(
        &self,
        conn: &mut PgConnection,
        conditions: &Conditions<ColumnOf<T>>,
        page: i64,
        page_size: i64,
        options: &QueryOptions<ColumnOf<T>>,
    ) -> Result<Page<T>, StoreError> {
        let offset = page_offset(page, page_size)?;

        let mut window = options.limit(page_size).offset(offset);
        if window.order_by.is_none() {
            // pages stay disjoint only under a total order
            window = window.order_by(T::primary_key_column(), SortOrder::Asc);
        }

        let total = self.count_on(conn, conditions).await?;
        let data = self.find_where_on(conn, conditions, &window).await?;
        Ok(Page::new(data, total, page, page_size))
    }

    /// Insert, then read the full row back by the key the database reports
    pub async fn create_on(&self, conn: &mut PgConnection, data: &T) -> Result<T, StoreError> {
        debug_log!("[{}] create: {}", T::table_name(), T::insert_sql());
        let id = data
            .execute_insert(conn)
            .await?
            .ok_or(StoreError::MissingCreatedRow {
                table: T::table_name(),
            })?;

        self.find_by_id_on(conn, &id)
            .await?
            .ok_or(StoreError::MissingCreatedRow {
                table: T::table_name(),
            })
    }

    /// Sequential inserts on one connection; atomic only inside a transaction
    pub async fn create_many_on(
        &self,
        conn: &mut PgConnection,
        items: &[T],
    ) -> Result<Vec<T>, StoreError> {
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            created.push(self.create_on(conn, item).await?);
        }
        Ok(created)
    }

    pub async fn update_on(
        &self,
        conn: &mut PgConnection,
        id: &T::Id,
        diff: UpdateSet<ColumnOf<T>>,
    ) -> Result<Option<T>, StoreError> {
        let diff = diff.retain(T::is_updatable);
        if diff.is_empty() {
            return self.find_by_id_on(conn, id).await;
        }

        let (set_clause, params) = SqlGenerator::build_set_clause(&diff, 1);
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ${} RETURNING *",
            T::table_name(),
            set_clause,
            T::primary_key_field(),
            params.len() + 1
        );
        debug_log!("[{}] update: {}", T::table_name(), sql);

        bind_rows(sqlx::query_as::<_, T>(&sql), params)
            .bind(id.clone())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "update", e))
    }

    /// Returns the number of rows written; an empty diff writes nothing
    pub async fn update_many_on(
        &self,
        conn: &mut PgConnection,
        conditions: &Conditions<ColumnOf<T>>,
        diff: UpdateSet<ColumnOf<T>>,
    ) -> Result<u64, StoreError> {
        let diff = diff.retain(T::is_updatable);
        if diff.is_empty() {
            return Ok(0);
        }

        let (sql, params) = Self::update_statement(&diff, conditions);
        debug_log!("[{}] update_many: {}", T::table_name(), sql);

        let result = bind_raw(sqlx::query(&sql), params)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "update_many", e))?;
        Ok(result.rows_affected())
    }

    pub async fn delete_on(&self, conn: &mut PgConnection, id: &T::Id) -> Result<bool, StoreError> {
        trace_log!("[{}] delete {:?}", T::table_name(), id);
        let result = sqlx::query(T::delete_by_id_sql())
            .bind(id.clone())
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many_on(
        &self,
        conn: &mut PgConnection,
        conditions: &Conditions<ColumnOf<T>>,
    ) -> Result<u64, StoreError> {
        let (where_clause, params) = SqlGenerator::build_where_clause(conditions, 1);
        let head = format!("DELETE FROM \"{}\"", T::table_name());
        let sql = SqlGenerator::assemble(&[&head, &where_clause]);
        debug_log!("[{}] delete_many: {}", T::table_name(), sql);

        let result = bind_raw(sqlx::query(&sql), params)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::database(T::table_name(), "delete_many", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl<T> StoreObject for TableStore<T>
where
    T: TableMetadata + DatabaseExecutor,
{
    type Model = T;

    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.find_by_id_on(&mut conn, id).await
    }

    async fn find_all(&self, options: QueryOptions<ColumnOf<T>>) -> Result<Vec<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.find_where_on(&mut conn, &Conditions::new(), &options).await
    }

    async fn find_where(
        &self,
        conditions: Conditions<ColumnOf<T>>,
        options: QueryOptions<ColumnOf<T>>,
    ) -> Result<Vec<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.find_where_on(&mut conn, &conditions, &options).await
    }

    async fn find_one_where(
        &self,
        conditions: Conditions<ColumnOf<T>>,
        options: QueryOptions<ColumnOf<T>>,
    ) -> Result<Option<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.find_one_where_on(&mut conn, &conditions, &options).await
    }

    async fn find_paginated(
        &self,
        page: i64,
        page_size: i64,
        options: QueryOptions<ColumnOf<T>>,
    ) -> Result<Page<T>, StoreError> {
        page_offset(page, page_size)?;
        let mut conn = self.acquire().await?;
        self.find_paginated_on(&mut conn, &Conditions::new(), page, page_size, &options)
            .await
    }

    async fn find_paginated_where(
        &self,
        conditions: Conditions<ColumnOf<T>>,
        page: i64,
        page_size: i64,
        options: QueryOptions<ColumnOf<T>>,
    ) -> Result<Page<T>, StoreError> {
        page_offset(page, page_size)?;
        let mut conn = self.acquire().await?;
        self.find_paginated_on(&mut conn, &conditions, page, page_size, &options)
            .await
    }

    async fn create(&self, data: T) -> Result<T, StoreError> {
        let mut conn = self.acquire().await?;
        self.create_on(&mut conn, &data).await
    }

    async fn create_many(&self, items: Vec<T>) -> Result<Vec<T>, StoreError> {
        let mut tx = self
            .db_pool
            .begin()
            .await
            .map_err(|e| StoreError::database(T::table_name(), "begin", e))?;

        // dropping `tx` on error rolls every insert back
        let created = self.create_many_on(&mut tx, &items).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::database(T::table_name(), "commit", e))?;
        Ok(created)
    }

    async fn update(
        &self,
        id: &T::Id,
        diff: UpdateSet<ColumnOf<T>>,
    ) -> Result<Option<T>, StoreError> {
        let mut conn = self.acquire().await?;
        self.update_on(&mut conn, id, diff).await
    }

    async fn update_many(
        &self,
        conditions: Conditions<ColumnOf<T>>,
        diff: UpdateSet<ColumnOf<T>>,
    ) -> Result<u64, StoreError> {
        let mut conn = self.acquire().await?;
        self.update_many_on(&mut conn, &conditions, diff).await
    }

    async fn delete(&self, id: &T::Id) -> Result<bool, StoreError> {
        let mut conn = self.acquire().await?;
        self.delete_on(&mut conn, id).await
    }

    async fn delete_many(&self, conditions: Conditions<ColumnOf<T>>) -> Result<u64, StoreError> {
        let mut conn = self.acquire().await?;
        self.delete_many_on(&mut conn, &conditions).await
    }

    async fn count(&self, conditions: Conditions<ColumnOf<T>>) -> Result<i64, StoreError> {
        let mut conn = self.acquire().await?;
        self.count_on(&mut conn, &conditions).await
    }
}
