//! Error types for the realmstore crate
//!
//! `ServiceError` classifies every failure of the domain service so the
//! calling layer can turn it into a status code without inspecting messages.

use serde_json::{Value, json};
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A business precondition does not hold
    #[error("Rule violation: {0}")]
    RuleViolation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn rule_violation(message: impl Into<String>) -> Self {
        ServiceError::RuleViolation(message.into())
    }

    /// HTTP status the caller should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound { .. } => 404,
            ServiceError::RuleViolation(_) => 422,
            // paging arguments are checked by the store layer
            ServiceError::Storage(StoreError::Validation(_)) => 400,
            ServiceError::Storage(_) => 500,
        }
    }

    /// Stable machine-readable code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) | ServiceError::Storage(StoreError::Validation(_)) => {
                "VALIDATION_ERROR"
            }
            ServiceError::NotFound { .. } => "NOT_FOUND",
            ServiceError::RuleViolation(_) => "RULE_VIOLATION",
            ServiceError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Status code and JSON body; server-side failures are logged and their
    /// details kept out of the body
    pub fn to_response(&self) -> (u16, Value) {
        let status = self.status_code();
        let message = if status >= 500 {
            tracing::error!(error = %self, "Storage failure in character service");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            json!({
                "success": false,
                "error": {
                    "code": self.code(),
                    "message": message,
                }
            }),
        )
    }
}
