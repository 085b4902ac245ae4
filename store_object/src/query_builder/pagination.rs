//! Page envelope for paginated reads

use crate::errors::StoreError;
use serde::{Deserialize, Serialize};

/// One page of rows plus the totals computed by an independent COUNT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        Self {
            data,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }
}

/// Check 1-based page arguments and return the row offset of the page
pub fn page_offset(page: i64, page_size: i64) -> Result<i64, StoreError> {
    if page < 1 {
        return Err(StoreError::validation(format!(
            "page must be at least 1, got {}",
            page
        )));
    }
    if page_size < 1 {
        return Err(StoreError::validation(format!(
            "page_size must be at least 1, got {}",
            page_size
        )));
    }
    (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| StoreError::validation("page offset overflows"))
}

/// `ceil(total / page_size)`, zero for an empty table
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}
