//! CLI module
//!
//! Command-line interface over [`MagentoClient`](crate::http::MagentoClient).
//!
//! # Commands
//!
//! - `get` - GET any API path
//! - `list` - Stream a paginated search endpoint
//! - `product` - Show a product by SKU
//! - `order` - Show an order by increment id
//! - `bulk-status` - Show the status of an async bulk operation

mod commands;
mod runner;

pub use commands::{parse_filter, parse_key_value, parse_sort_order, Cli, Commands, OutputFormat};
pub use runner::Runner;
