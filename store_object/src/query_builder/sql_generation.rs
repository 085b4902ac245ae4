//! SQL fragment generation
//!
//! Each builder takes the number of the first placeholder it may use and
//! returns its fragment together with the values to bind, in placeholder
//! order. Callers chain fragments by starting the next one at
//! `first_param + values.len()`.

use crate::query_builder::filter::{Conditions, Predicate, QueryOperator};
use crate::query_builder::ordering::QueryOptions;
use crate::query_builder::update::UpdateSet;
use crate::traits::ColumnName;
use type_mapping::PostgresValue;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions
    pub fn build_where_clause<C: ColumnName>(
        conditions: &Conditions<C>,
        first_param: usize,
    ) -> (String, Vec<PostgresValue>) {
        if conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut values = Vec::new();
        let mut param_counter = first_param;

        let conditions_sql = conditions
            .predicates()
            .iter()
            .map(|predicate| Self::build_predicate_sql(predicate, &mut values, &mut param_counter))
            .collect::<Vec<_>>()
            .join(" AND ");

        (format!("WHERE {}", conditions_sql), values)
    }

    fn build_predicate_sql<C: ColumnName>(
        predicate: &Predicate<C>,
        values: &mut Vec<PostgresValue>,
        param_counter: &mut usize,
    ) -> String {
        let field = predicate.column.as_str();

        if predicate.value.is_null() {
            return match predicate.operator {
                QueryOperator::Eq => format!("\"{}\" IS NULL", field),
                QueryOperator::Ne => format!("\"{}\" IS NOT NULL", field),
                // ordering against NULL never matches
                _ => "1=0".to_string(),
            };
        }

        values.push(predicate.value.clone());
        let sql = format!(
            "\"{}\" {} ${}",
            field,
            predicate.operator.to_sql(),
            param_counter
        );
        *param_counter += 1;
        sql
    }

    /// Build ORDER BY clause
    pub fn build_order_clause<C: ColumnName>(options: &QueryOptions<C>) -> String {
        match options.order_by {
            Some(column) => format!(
                "ORDER BY \"{}\" {}",
                column.as_str(),
                options.order_direction.to_sql()
            ),
            None => String::new(),
        }
    }

    /// Build LIMIT/OFFSET clause with both values bound as parameters
    pub fn build_limit_clause<C: ColumnName>(
        options: &QueryOptions<C>,
        first_param: usize,
    ) -> (String, Vec<PostgresValue>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        let mut param_counter = first_param;

        if let Some(limit) = options.limit {
            clauses.push(format!("LIMIT ${}", param_counter));
            values.push(PostgresValue::from(limit));
            param_counter += 1;
        }

        if let Some(offset) = options.offset {
            clauses.push(format!("OFFSET ${}", param_counter));
            values.push(PostgresValue::from(offset));
        }

        (clauses.join(" "), values)
    }

    /// Build the SET list of an UPDATE, always touching `__updated_at__`
    pub fn build_set_clause<C: ColumnName>(
        update_set: &UpdateSet<C>,
        first_param: usize,
    ) -> (String, Vec<PostgresValue>) {
        let mut assignments = Vec::with_capacity(update_set.len() + 1);
        let mut values = Vec::with_capacity(update_set.len());

        for (i, (column, operation)) in update_set.operations().iter().enumerate() {
            assignments.push(operation.to_sql(column.as_str(), first_param + i));
            values.push(operation.value().clone());
        }
        assignments.push("\"__updated_at__\" = NOW()".to_string());

        (assignments.join(", "), values)
    }

    /// Join non-empty fragments with single spaces
    pub fn assemble(parts: &[&str]) -> String {
        let capacity = parts.iter().map(|p| p.len() + 1).sum();
        let mut sql = String::with_capacity(capacity);
        for part in parts.iter().filter(|p| !p.is_empty()) {
            if !sql.is_empty() {
                sql.push(' ');
            }
            sql.push_str(part);
        }
        sql
    }
}
