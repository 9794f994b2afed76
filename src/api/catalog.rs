//! Products, product media, stock items and configurable products

use super::first;
use crate::error::{Error, Result};
use crate::http::{escape_path, raise_for_response, ApiResponse, MagentoClient, RequestOptions};
use crate::pagination::{EntityStream, ListOptions};
use crate::query::make_field_value_query;
use crate::types::{Entity, JsonValue, Query, Sku};
use futures::TryStreamExt;
use reqwest::Method;
use serde_json::json;
use std::fmt::Display;
use tracing::debug;

/// `{"product": ..., "saveOptions": ...}` payload
fn product_payload(product: Entity, save_options: Option<bool>) -> JsonValue {
    let mut payload = json!({ "product": product });
    if let Some(save_options) = save_options {
        payload["saveOptions"] = json!(save_options);
    }
    payload
}

fn product_path(sku: &Sku) -> String {
    format!("/V1/products/{}", escape_path(sku))
}

impl MagentoClient {
    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Status of an async bulk operation
    pub async fn get_bulk_status(&self, bulk_uuid: &str) -> Result<Entity> {
        let path = format!("/V1/bulk/{}/status", escape_path(bulk_uuid));
        self.get_json(&path, None).await
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub fn get_products(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/products", options)
    }

    pub async fn get_products_types(&self) -> Result<Option<Vec<Entity>>> {
        self.get_json_api("/V1/product/types", None).await
    }

    /// A product by SKU; `None` if it doesn't exist
    pub async fn get_product(&self, sku: &Sku) -> Result<Option<Entity>> {
        self.get_json_api(&product_path(sku), None).await
    }

    /// A product by entity id; `None` if it doesn't exist
    pub async fn get_product_by_id(&self, product_id: u64) -> Result<Option<Entity>> {
        let query = make_field_value_query("entity_id", product_id, None);
        first(self.get_products(ListOptions::new().query(query).limit(1))).await
    }

    /// The product matching `query`.
    ///
    /// With `expect_one`, more than one match is an [`Error::Assertion`];
    /// otherwise the first match is returned.
    pub async fn get_product_by_query(&self, query: Query, expect_one: bool) -> Result<Option<Entity>> {
        if !expect_one {
            return first(self.get_products(ListOptions::new().query(query).limit(1))).await;
        }

        let mut products: Vec<Entity> = self
            .get_products(ListOptions::new().query(query.clone()).limit(2))
            .try_collect()
            .await?;

        if products.len() > 1 {
            return Err(Error::assertion(format!(
                "got more than one product for query {}",
                serde_json::to_string(&query)?
            )));
        }
        Ok(products.pop())
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Gallery entries of a product
    pub async fn get_product_medias(&self, sku: &Sku) -> Result<Option<Vec<Entity>>> {
        let path = format!("{}/media", product_path(sku));
        self.get_json_api(&path, None).await
    }

    pub async fn get_product_media(&self, sku: &Sku, media_id: impl Display) -> Result<Option<Entity>> {
        let path = format!("{}/media/{media_id}", product_path(sku));
        self.get_json_api(&path, None).await
    }

    /// Save a gallery entry and return its id
    pub async fn save_product_media(&self, sku: &Sku, media_entry: Entity) -> Result<JsonValue> {
        let path = format!("{}/media", product_path(sku));
        self.send_json(Method::POST, &path, json!({ "entry": media_entry }))
            .await
    }

    pub async fn delete_product_media(&self, sku: &Sku, media_id: impl Display) -> Result<ApiResponse> {
        let path = format!("{}/media/{media_id}", product_path(sku));
        self.delete_api(&path, RequestOptions::new()).await
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Save a (possibly partial) product
    pub async fn save_product(&self, product: Entity, save_options: Option<bool>) -> Result<Entity> {
        let options = RequestOptions::new().json(product_payload(product, save_options));
        let response = self.post_api("/V1/products", options).await?;
        debug!("Save product response: {}", response.text());
        raise_for_response(&response)?;
        response.json()
    }

    /// Update a product.
    ///
    /// To rename a SKU, pass the product `id` with the new `sku` and set
    /// `save_options`.
    pub async fn update_product(
        &self,
        sku: &Sku,
        product: Entity,
        save_options: Option<bool>,
    ) -> Result<Entity> {
        self.send_json(
            Method::PUT,
            &product_path(sku),
            product_payload(product, save_options),
        )
        .await
    }

    /// Delete a product.
    ///
    /// With `skip_missing`, a 404 returns `false` instead of an error.
    pub async fn delete_product(&self, sku: &Sku, skip_missing: bool) -> Result<bool> {
        match self
            .delete_api(&product_path(sku), RequestOptions::raising())
            .await
        {
            Ok(response) => response.json(),
            Err(err) if skip_missing && err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Update several products through the async bulk API.
    ///
    /// Every product must carry its `sku`.
    pub async fn async_update_products<I>(&self, products: I) -> Result<Entity>
    where
        I: IntoIterator<Item = Entity>,
    {
        let payload: Vec<JsonValue> = products
            .into_iter()
            .map(|product| json!({ "product": product }))
            .collect();

        self.put_api(
            "/V1/products/bySku",
            RequestOptions::raising()
                .json(JsonValue::Array(payload))
                .async_bulk(),
        )
        .await?
        .json()
    }

    // ========================================================================
    // Stock
    // ========================================================================

    pub async fn set_product_stock_item(
        &self,
        sku: &Sku,
        quantity: i64,
        is_in_stock: bool,
    ) -> Result<ApiResponse> {
        let path = format!("{}/stockItems/1", product_path(sku));
        let payload = json!({
            "stockItem": {"qty": quantity, "is_in_stock": u8::from(is_in_stock)}
        });
        self.put_api(&path, RequestOptions::raising().json(payload))
            .await
    }

    pub async fn get_product_stock_status(&self, sku: &Sku) -> Result<Entity> {
        self.get_json(&format!("/V1/stockStatuses/{}", escape_path(sku)), None)
            .await
    }

    pub async fn get_product_stock_item(&self, sku: &Sku) -> Result<Entity> {
        self.get_json(&format!("/V1/stockItems/{}", escape_path(sku)), None)
            .await
    }

    // ========================================================================
    // Configurable products
    // ========================================================================

    /// Make `child_sku` a child of `parent_sku`
    pub async fn link_child_product(&self, parent_sku: &Sku, child_sku: &Sku) -> Result<ApiResponse> {
        let path = format!("/V1/configurable-products/{}/child", escape_path(parent_sku));
        self.post_api(
            &path,
            RequestOptions::new().json(json!({ "childSku": child_sku })),
        )
        .await
    }

    pub async fn unlink_child_product(
        &self,
        parent_sku: &Sku,
        child_sku: &Sku,
    ) -> Result<ApiResponse> {
        let path = format!(
            "/V1/configurable-products/{}/children/{}",
            escape_path(parent_sku),
            escape_path(child_sku)
        );
        self.delete_api(&path, RequestOptions::new()).await
    }

    pub async fn save_configurable_product_option(
        &self,
        sku: &Sku,
        option: Entity,
    ) -> Result<ApiResponse> {
        let path = format!("/V1/configurable-products/{}/options", escape_path(sku));
        self.post_api(&path, RequestOptions::new().json(json!({ "option": option })))
            .await
    }
}
