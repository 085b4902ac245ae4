//! # realmstore
//!
//! Game-state persistence on PostgreSQL: generic table stores generated from
//! annotated models, explicit transactions, and a character service that
//! composes them into atomic multi-table operations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use realmstore::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let registry = Arc::new(Registry::connect(&config.database).await?);
//!     let service = CharacterService::new(registry, config.service);
//!
//!     let mut new = NewCharacter::named("Lin Feng");
//!     new.wallet = Some(CharacterWallet { gold: 100, ..Default::default() });
//!
//!     let created = service.create_character(new).await?;
//!     let character = service.get_complete_character_info(created.base_info.id).await?;
//!     println!("{}", serde_json::to_string_pretty(&character)?);
//!     Ok(())
//! }
//! ```
//!
//! Statement-level SQL logging is compiled in with the `debug-logging`
//! feature.

pub mod core;
pub mod errors;
pub mod models;
pub mod prelude;
pub mod services;

// Re-export the main public types for convenience
pub use crate::core::Registry;
pub use crate::errors::ServiceError;
pub use crate::services::CharacterService;

pub use config::{AppConfig, DatabaseConfig, ServiceConfig};

// Member crates used by the public API
pub use config;
pub use store_object;
pub use table_derive;
pub use type_mapping;
