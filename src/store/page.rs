use serde::Serialize;

use super::error::{StoreError, StoreResult};

/// Validated paging window. Construction is the only way to obtain one, so a
/// handler holding a `PageRequest` never issues a store call with a
/// degenerate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
    skip: u64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> StoreResult<Self> {
        if limit <= 0 {
            return Err(StoreError::invalid_paging(format!(
                "limit must be greater than 0, got {limit}"
            )));
        }
        if page < 1 {
            return Err(StoreError::invalid_paging(format!(
                "page must be at least 1, got {page}"
            )));
        }

        let page = page as u64;
        let limit = limit as u64;
        // Stores take skip as a signed 64-bit value.
        let skip = (page - 1)
            .checked_mul(limit)
            .filter(|skip| i64::try_from(*skip).is_ok())
            .ok_or_else(|| StoreError::invalid_paging("page window is out of range"))?;

        Ok(Self { page, limit, skip })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Records skipped before the window starts: 0 for the first page,
    /// `(page - 1) * limit` afterwards.
    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.limit)
    }
}

/// A window over a query's matching records plus count metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page_count: u64,
    pub total_count: u64,
}

impl<T> Paginated<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_count: 0,
            total_count: 0,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page_count: self.page_count,
            total_count: self.total_count,
        }
    }
}
