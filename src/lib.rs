// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # Magento REST client
//!
//! An async client for the Magento 2 REST API.
//!
//! ## Features
//!
//! - **Request executor**: bearer token, `/rest/{scope}[/async/bulk]` paths,
//!   fixed-delay retries and Magento error envelopes mapped to errors
//! - **Lazy pagination**: search endpoints as a `Stream` of entities, one
//!   page fetched at a time, with an optional item limit
//! - **Search criteria builders**: filters, filter groups and sort orders
//! - **Resource wrappers**: products, orders, categories, prices, inventory, ...
//! - **Batch helpers**: `in`-filtered lookups and bulk product saves
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use magento_client::{make_field_value_query, ListOptions, MagentoClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // MAGENTO_BASE_URL and MAGENTO_TOKEN
//!     let client = MagentoClient::from_env()?;
//!
//!     let product = client.get_product("SKU-1").await?;
//!
//!     let query = make_field_value_query("status", "pending", None);
//!     let mut orders = client.get_orders(None, None, ListOptions::new().query(query).limit(100));
//!     while let Some(order) = orders.try_next().await? {
//!         println!("{}", order["increment_id"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │         Resource wrappers (api)   ·   Batches (batches)    │
//! └────────────────────────────────────────────────────────────┘
//!                │                              │
//! ┌──────────────┴───────────┐   ┌──────────────┴─────────────┐
//! │  Paginator (pagination)  │──▶│  Request executor (http)   │
//! │  pageSize / currentPage  │   │  retry · raise · read-only │
//! └──────────────────────────┘   └────────────────────────────┘
//!                │
//! ┌──────────────┴───────────┐
//! │  Search criteria (query) │
//! └──────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Search criteria builders
pub mod query;

/// Request executor
pub mod http;

/// Lazy pagination of search endpoints
pub mod pagination;

/// Resource wrappers
pub mod api;

/// Custom attribute helpers
pub mod custom_attributes;

/// Order and date helpers
pub mod helpers;

/// Batched lookups and saves
pub mod batches;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiError, Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::{SourceItemFilter, DEFAULT_ATTRIBUTE};
pub use batches::{BatchGetter, BatchSaveReport, ProductBatchSaver};
pub use config::ClientConfig;
pub use helpers::{
    format_datetime, get_order_shipping_address, is_order_cash_on_delivery, is_order_on_hold,
};
pub use http::{escape_path, ApiResponse, MagentoClient, RequestOptions};
pub use pagination::{EntityStream, ListOptions};
pub use query::{make_field_value_query, make_search_query, Filter, SearchQuery, SortOrder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
