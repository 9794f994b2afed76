//! Pagination module
//!
//! # Overview
//!
//! Magento search endpoints take `searchCriteria[pageSize]` and
//! `searchCriteria[currentPage]` and answer with `items` and `total_count`.
//! [`MagentoClient::paginate`](crate::http::MagentoClient::paginate) turns
//! such an endpoint into a lazy [`EntityStream`] that stops when a page is
//! empty, when `total_count` items were yielded, or at the caller's limit.

mod paginator;
mod types;

pub use paginator::EntityStream;
pub use types::{ListOptions, PageResponse, PaginationState};
