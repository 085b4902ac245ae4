use crate::traits::ColumnName;
use type_mapping::PostgresValue;

/// Type of update operation to perform on a field
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperation {
    /// Set field to a specific value: field = $N
    Set(PostgresValue),

    /// Increment field by a value: field = field + $N
    Increment(PostgresValue),

    /// Decrement field by a value: field = field - $N
    Decrement(PostgresValue),
}

impl UpdateOperation {
    /// Generate the SQL assignment for this operation
    /// Example: `"count" = "count" + $3`
    pub fn to_sql(&self, field_name: &str, param_number: usize) -> String {
        match self {
            UpdateOperation::Set(_) => {
                format!("\"{}\" = ${}", field_name, param_number)
            }
            UpdateOperation::Increment(_) => {
                format!("\"{0}\" = \"{0}\" + ${1}", field_name, param_number)
            }
            UpdateOperation::Decrement(_) => {
                format!("\"{0}\" = \"{0}\" - ${1}", field_name, param_number)
            }
        }
    }

    /// Get the value to bind as a parameter
    pub fn value(&self) -> &PostgresValue {
        match self {
            UpdateOperation::Set(v) | UpdateOperation::Increment(v) | UpdateOperation::Decrement(v) => v,
        }
    }
}

/// Ordered column assignments for an UPDATE
///
/// Writing the same column twice keeps the later operation in the position
/// of the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSet<C: ColumnName> {
    operations: Vec<(C, UpdateOperation)>,
}

impl<C: ColumnName> Default for UpdateSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ColumnName> UpdateSet<C> {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    fn push(mut self, column: C, operation: UpdateOperation) -> Self {
        match self.operations.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = operation,
            None => self.operations.push((column, operation)),
        }
        self
    }

    /// Set a field to a specific value
    pub fn set(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.push(column, UpdateOperation::Set(value.into()))
    }

    /// Increment a field by a value (atomic: field = field + value)
    pub fn increment(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.push(column, UpdateOperation::Increment(value.into()))
    }

    /// Decrement a field by a value (atomic: field = field - value)
    pub fn decrement(self, column: C, value: impl Into<PostgresValue>) -> Self {
        self.push(column, UpdateOperation::Decrement(value.into()))
    }

    /// Keep only the operations whose column passes `keep`
    pub fn retain(mut self, keep: impl Fn(C) -> bool) -> Self {
        self.operations.retain(|(c, _)| keep(*c));
        self
    }

    pub fn operations(&self) -> &[(C, UpdateOperation)] {
        &self.operations
    }

    /// Check if there are any operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Get number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
