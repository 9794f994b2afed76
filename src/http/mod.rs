//! HTTP module
//!
//! Request execution against the Magento REST API.
//!
//! # Features
//!
//! - **Path Construction**: `/rest/{scope}[/async/bulk]/V1/...`
//! - **Authentication**: Bearer token sent on every request
//! - **Fixed-Delay Retries**: Caller-controlled retry count per request
//! - **Error Mapping**: Magento error envelopes become structured errors

mod client;
mod response;

pub use client::{escape_path, MagentoClient, RequestOptions, API_PATH_PREFIX};
pub use response::{raise_for_response, ApiResponse};

#[cfg(test)]
mod tests;
