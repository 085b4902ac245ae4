use thiserror::Error;

/// Errors raised by the access layer
///
/// Absence of a row is never an error here: lookups return `Option`,
/// deletes return `bool` or an affected-row count.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error on {table} during {operation}: {source}")]
    Database {
        table: &'static str,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Row inserted into {table} could not be read back")]
    MissingCreatedRow { table: &'static str },

    #[error("Transaction is already active")]
    TransactionAlreadyActive,

    #[error("Transaction is not active")]
    TransactionNotActive,
}

impl StoreError {
    pub fn database(table: &'static str, operation: &'static str, source: sqlx::Error) -> Self {
        StoreError::Database {
            table,
            operation,
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}
