//! Ordering and row-window options

use crate::traits::ColumnName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Single-column ordering plus LIMIT/OFFSET
///
/// Every field is optional; an empty value adds nothing to the statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions<C: ColumnName> {
    pub order_by: Option<C>,
    pub order_direction: SortOrder,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl<C: ColumnName> Default for QueryOptions<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColumnName> QueryOptions<C> {
    pub fn new() -> Self {
        Self {
            order_by: None,
            order_direction: SortOrder::Asc,
            limit: None,
            offset: None,
        }
    }

    pub fn order_by(mut self, column: C, direction: SortOrder) -> Self {
        self.order_by = Some(column);
        self.order_direction = direction;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}
