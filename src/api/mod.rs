//! Resource wrappers
//!
//! Thin methods on [`MagentoClient`](crate::http::MagentoClient), one file per
//! resource family. Listings return a lazy
//! [`EntityStream`](crate::pagination::EntityStream); single-record lookups
//! return `None` when Magento answers 404. Methods returning an
//! [`ApiResponse`](crate::http::ApiResponse) hand back the raw response
//! without raising, so callers can inspect failures themselves.

mod attributes;
mod catalog;
mod categories;
mod content;
mod customers;
mod inventory;
mod prices;
mod sales;
mod store;

pub use attributes::DEFAULT_ATTRIBUTE;
pub use inventory::SourceItemFilter;

use crate::error::{Error, Result};
use crate::pagination::EntityStream;
use crate::types::{Entity, JsonValue};
use futures::TryStreamExt;

/// First entity of a listing
async fn first(mut stream: EntityStream<'_>) -> Result<Option<Entity>> {
    stream.try_next().await
}

/// Required field of a record
fn required_field<'a>(record: &'a Entity, field: &str) -> Result<&'a JsonValue> {
    record
        .get(field)
        .ok_or_else(|| Error::assertion(format!("record has no '{field}' field")))
}
