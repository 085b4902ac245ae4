//! Convenience re-exports for common realmstore usage
//!
//! ```rust
//! use realmstore::prelude::*;
//! ```

// Registry, service and errors
pub use crate::core::Registry;
pub use crate::errors::ServiceError;
pub use crate::services::{
    BreakthroughOutcome, CharacterAggregate, CharacterService, NewCharacter, Statistics,
};

// Entity models
pub use crate::models::*;

// Configuration
pub use config::{AppConfig, ConfigError, DatabaseConfig, ServiceConfig};

// Store layer
pub use store_object::prelude::*;

// Model derive
pub use table_derive::{TableMetadata, model};

// Common external types
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;
