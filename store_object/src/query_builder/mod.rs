//! Query builder utilities
//!
//! This module provides SQL query construction utilities.

pub mod filter;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod update;

#[cfg(test)]
mod tests;

pub use filter::{Conditions, Predicate, QueryOperator};
pub use ordering::{QueryOptions, SortOrder};
pub use pagination::Page;
pub use sql_generation::SqlGenerator;
pub use update::{UpdateOperation, UpdateSet};
