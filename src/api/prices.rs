//! Base and special prices
//!
//! Price lookups are POST requests that only read, so they are sent even by
//! a read-only client.

use crate::error::Result;
use crate::http::{ApiResponse, MagentoClient, RequestOptions};
use crate::types::{Entity, JsonValue};
use serde_json::json;

fn skus_payload<I, S>(skus: I) -> JsonValue
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let skus: Vec<String> = skus.into_iter().map(|s| s.as_ref().to_string()).collect();
    json!({ "skus": skus })
}

impl MagentoClient {
    async fn read_prices(&self, path: &str, skus: JsonValue) -> Result<Vec<Entity>> {
        self.post_api(
            path,
            RequestOptions::raising().json(skus).bypass_read_only(),
        )
        .await?
        .json()
    }

    // ========================================================================
    // Base prices
    // ========================================================================

    /// Base prices of the given SKUs
    pub async fn get_base_prices<I, S>(&self, skus: I) -> Result<Vec<Entity>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read_prices("/V1/products/base-prices-information", skus_payload(skus))
            .await
    }

    /// Save base prices (`{"price": 3.14, "sku": "W1033", "store_id": 0}`)
    pub async fn save_base_prices(&self, prices: Vec<Entity>) -> Result<ApiResponse> {
        self.post_api(
            "/V1/products/base-prices",
            RequestOptions::new().json(json!({ "prices": prices })),
        )
        .await
    }

    // ========================================================================
    // Special prices
    // ========================================================================

    pub async fn get_special_prices<I, S>(&self, skus: I) -> Result<Vec<Entity>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.read_prices("/V1/products/special-price-information", skus_payload(skus))
            .await
    }

    /// Save special prices.
    ///
    /// Each one has `store_id`, `sku`, `price`, `price_from` and `price_to`;
    /// dates use [`format_datetime`](crate::helpers::format_datetime).
    pub async fn save_special_prices(&self, special_prices: Vec<Entity>) -> Result<ApiResponse> {
        self.post_api(
            "/V1/products/special-price",
            RequestOptions::new().json(json!({ "prices": special_prices })),
        )
        .await
    }

    pub async fn delete_special_prices(&self, special_prices: Vec<Entity>) -> Result<ApiResponse> {
        self.post_api(
            "/V1/products/special-price-delete",
            RequestOptions::new().json(json!({ "prices": special_prices })),
        )
        .await
    }

    /// Delete every special price of the given SKUs
    pub async fn delete_special_prices_by_sku<I, S>(&self, skus: I) -> Result<ApiResponse>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let special_prices = self.get_special_prices(skus).await?;
        self.delete_special_prices(special_prices).await
    }
}
