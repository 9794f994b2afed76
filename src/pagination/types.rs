//! Pagination types
//!
//! Options accepted by list endpoints and the page envelope returned by
//! Magento search endpoints.

use crate::error::{Error, Result};
use crate::types::{Entity, Query};
use serde::Deserialize;

/// Options for a paginated listing
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Search criteria; copied, never modified
    pub query: Option<Query>,
    /// Maximum number of items to yield; `None` for no limit
    pub limit: Option<usize>,
    /// Retry count for each page request
    pub retry: u32,
}

impl ListOptions {
    /// Create options with no query and no limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search criteria
    #[must_use]
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Limit the number of items
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Retry each failed page request this many times
    #[must_use]
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Page size for a client whose default page size is `default_page_size`
    pub fn page_size(&self, default_page_size: usize) -> usize {
        match self.limit {
            Some(limit) if limit > 0 => default_page_size.min(limit),
            _ => default_page_size,
        }
    }
}

/// One page of a search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageResponse {
    /// Items of this page
    #[serde(default)]
    pub items: Option<Vec<Entity>>,
    /// Number of matching entities across all pages
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl PageResponse {
    /// Take the items, treating a missing or null array as empty
    pub fn take_items(&mut self) -> Vec<Entity> {
        self.items.take().unwrap_or_default()
    }

    /// Total count; required once a page has items
    pub fn total_count(&self) -> Result<u64> {
        self.total_count
            .ok_or_else(|| Error::decode("page response has items but no total_count"))
    }
}

/// Progress of a paginated listing
#[derive(Debug, Clone)]
pub struct PaginationState {
    /// Next page to request (1-based)
    pub current_page: usize,
    /// Items yielded so far
    pub yielded: usize,
    /// Total count reported by the last page
    pub total_count: Option<u64>,
    /// Page requests issued so far
    pub pages_fetched: usize,
    /// Is pagination complete?
    pub done: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            yielded: 0,
            total_count: None,
            pages_fetched: 0,
            done: false,
        }
    }
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record a fetched page and move to the next one
    pub fn page_fetched(&mut self, total_count: u64) {
        self.total_count = Some(total_count);
        self.pages_fetched += 1;
        self.current_page += 1;
    }

    /// Record a yielded item; returns true when the listing is exhausted
    pub fn item_yielded(&mut self, limit: Option<usize>) -> bool {
        self.yielded += 1;
        let reached_total = self
            .total_count
            .is_some_and(|total| self.yielded as u64 >= total);
        let reached_limit = limit.is_some_and(|limit| self.yielded >= limit);
        if reached_total || reached_limit {
            self.done = true;
        }
        self.done
    }
}
