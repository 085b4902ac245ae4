pub mod aggregate;
pub mod core;
pub mod store_object;
pub mod transaction;

pub use core::{ReferenceStore, TableStore};
pub use transaction::{IsolationLevel, Transaction};
