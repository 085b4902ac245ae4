//! Typed WHERE conditions
//!
//! A `Conditions` value is an AND-combined list of predicates over one
//! table's column enumeration. Values travel as bind parameters; only the
//! quoted column identifier ever reaches the SQL text.

use crate::traits::ColumnName;
use type_mapping::PostgresValue;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,  // =
    Ne,  // !=
    Gt,  // >
    Gte, // >=
    Lt,  // <
    Lte, // <=
}

impl QueryOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
        }
    }
}

/// Single predicate in a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<C: ColumnName> {
    pub column: C,
    pub operator: QueryOperator,
    pub value: PostgresValue,
}

/// AND-combined predicates
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions<C: ColumnName> {
    predicates: Vec<Predicate<C>>,
}

impl<C: ColumnName> Default for Conditions<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColumnName> Conditions<C> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate with an explicit operator
    pub fn filter(mut self, column: C, operator: QueryOperator, value: impl Into<PostgresValue>) -> Self {
        self.predicates.push(Predicate {
            column,
            operator,
            value: value.into(),
        });
        self
    }

    /// Equal condition; a NULL value renders `IS NULL`
    pub fn eq(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.filter(column, QueryOperator::Eq, value)
    }

    /// Equal condition that is skipped entirely when the value is absent
    pub fn eq_opt<V: Into<PostgresValue>>(self, column: C, value: Option<V>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    /// Not equal condition; a NULL value renders `IS NOT NULL`
    pub fn ne(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.filter(column, QueryOperator::Ne, value)
    }

    pub fn gt(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.filter(column, QueryOperator::Gt, value)
    }

    pub fn gte(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.filter(column, QueryOperator::Gte, value)
    }

    pub fn lt(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.filter(column, QueryOperator::Lt, value)
    }

    pub fn lte(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.filter(column, QueryOperator::Lte, value)
    }

    pub fn predicates(&self) -> &[Predicate<C>] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }
}
