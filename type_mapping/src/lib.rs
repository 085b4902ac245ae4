//! Unified type mapping between Rust types and PostgreSQL
//! This crate provides the bind values and the type mapping used across the realmstore workspace

pub mod sql;
pub mod types;

pub use sql::{is_optional_type, rust_type_to_pg_type};
pub use types::PostgresValue;
