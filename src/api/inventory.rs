//! Inventory sources, source items and stock/source links

use super::required_field;
use crate::error::Result;
use crate::http::{escape_path, ApiResponse, MagentoClient, RequestOptions};
use crate::pagination::{EntityStream, ListOptions};
use crate::query::{make_search_query, Filter};
use crate::types::{Entity, JsonValue};
use futures::TryStreamExt;
use serde_json::json;

/// Source code Magento assigns to new products
const DEFAULT_SOURCE_CODE: &str = "default";

/// Filter for [`MagentoClient::get_source_items`].
///
/// When any field is set it replaces the query of the list options. `sku`
/// takes precedence over `skus`.
#[derive(Debug, Clone, Default)]
pub struct SourceItemFilter {
    pub source_code: Option<String>,
    pub sku: Option<String>,
    pub skus: Vec<String>,
}

impl SourceItemFilter {
    /// Items of one source
    pub fn source(source_code: impl Into<String>) -> Self {
        Self {
            source_code: Some(source_code.into()),
            ..Self::default()
        }
    }

    /// Items of one SKU
    pub fn sku(sku: impl Into<String>) -> Self {
        Self {
            sku: Some(sku.into()),
            ..Self::default()
        }
    }

    /// Items of several SKUs
    pub fn skus<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skus: skus.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.source_code.is_none() && self.sku.is_none() && self.skus.is_empty()
    }

    fn filter_groups(&self) -> Vec<Vec<Filter>> {
        let mut groups = Vec::new();
        if let Some(source_code) = &self.source_code {
            groups.push(vec![Filter::eq("source_code", source_code.as_str())]);
        }
        if let Some(sku) = &self.sku {
            groups.push(vec![Filter::eq("sku", sku.as_str())]);
        } else if !self.skus.is_empty() {
            groups.push(vec![Filter::is_in("sku", &self.skus)]);
        }
        groups
    }
}

impl MagentoClient {
    // ========================================================================
    // Sources
    // ========================================================================

    pub fn get_sources(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/inventory/sources", options)
    }

    /// A source by code; `None` if it doesn't exist
    pub async fn get_source(&self, source_code: &str) -> Result<Option<Entity>> {
        let path = format!("/V1/inventory/sources/{}", escape_path(source_code));
        self.get_json_api(&path, None).await
    }

    pub async fn save_source(&self, source: Entity) -> Result<JsonValue> {
        self.post_api(
            "/V1/inventory/sources",
            RequestOptions::raising().json(json!({ "source": source })),
        )
        .await?
        .json()
    }

    // ========================================================================
    // Source items
    // ========================================================================

    pub fn get_source_items(
        &self,
        filter: &SourceItemFilter,
        mut options: ListOptions,
    ) -> EntityStream<'_> {
        if !filter.is_empty() {
            options.query = Some(make_search_query(filter.filter_groups(), &[]));
        }
        self.paginate("/V1/inventory/source-items", options)
    }

    /// Save source items; `None` without a request when there are none
    pub async fn save_source_items(&self, source_items: Vec<Entity>) -> Result<Option<JsonValue>> {
        if source_items.is_empty() {
            return Ok(None);
        }
        self.post_api(
            "/V1/inventory/source-items",
            RequestOptions::raising().json(json!({ "sourceItems": source_items })),
        )
        .await?
        .json()
        .map(Some)
    }

    /// Delete source items; only their `sku` and `source_code` are sent.
    ///
    /// Magento rejects an empty list.
    pub async fn delete_source_items(&self, source_items: &[Entity]) -> Result<ApiResponse> {
        let items = source_items
            .iter()
            .map(|item| {
                Ok(json!({
                    "sku": required_field(item, "sku")?,
                    "source_code": required_field(item, "source_code")?,
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        self.post_api(
            "/V1/inventory/source-items-delete",
            RequestOptions::raising().json(json!({ "sourceItems": items })),
        )
        .await
    }

    /// Delete every item of the `default` source; `None` if there are none
    pub async fn delete_default_source_items(&self) -> Result<Option<ApiResponse>> {
        let items: Vec<Entity> = self
            .get_source_items(
                &SourceItemFilter::source(DEFAULT_SOURCE_CODE),
                ListOptions::new(),
            )
            .try_collect()
            .await?;

        if items.is_empty() {
            return Ok(None);
        }
        self.delete_source_items(&items).await.map(Some)
    }

    pub fn get_stock_source_links(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/inventory/stock-source-links", options)
    }
}
