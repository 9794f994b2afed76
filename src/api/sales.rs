//! Carts, coupons, sales rules, credit memos, invoices, orders and shipments

use super::{first, required_field};
use crate::error::Result;
use crate::http::{ApiResponse, MagentoClient, RequestOptions};
use crate::pagination::{EntityStream, ListOptions};
use crate::query::{make_field_value_query, make_search_query, Filter, SortOrder};
use crate::types::{Entity, JsonValue};
use futures::TryStreamExt;
use reqwest::Method;
use serde_json::json;
use std::fmt::Display;

impl MagentoClient {
    // ========================================================================
    // Carts, coupons, sales rules, credit memos
    // ========================================================================

    pub fn get_carts(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/carts/search", options)
    }

    pub fn get_coupons(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/coupons/search", options)
    }

    pub fn get_sales_rules(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/salesRules/search", options)
    }

    pub fn get_credit_memos(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/creditmemos", options)
    }

    // ========================================================================
    // Invoices
    // ========================================================================

    /// Invoice an order.
    ///
    /// `notify` is used unless the payload already has a `notify` key.
    pub async fn create_order_invoice(
        &self,
        order_id: impl Display,
        payload: Option<Entity>,
        notify: bool,
    ) -> Result<JsonValue> {
        let mut payload = payload.unwrap_or_else(|| json!({}));
        if let Some(fields) = payload.as_object_mut() {
            fields.entry("notify").or_insert(json!(notify));
        }
        self.send_json(Method::POST, &format!("/V1/order/{order_id}/invoice"), payload)
            .await
    }

    pub async fn get_invoice(&self, invoice_id: u64) -> Result<Entity> {
        self.get_json(&format!("/V1/invoices/{invoice_id}"), None)
            .await
    }

    pub async fn get_invoice_by_increment_id(&self, increment_id: &str) -> Result<Option<Entity>> {
        let query = make_field_value_query("increment_id", increment_id, None);
        first(self.get_invoices(ListOptions::new().query(query).limit(1))).await
    }

    pub fn get_invoices(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/invoices", options)
    }

    /// Invoices of an order, by order id
    pub fn get_order_invoices(&self, order_id: impl Into<JsonValue>) -> EntityStream<'_> {
        let query = make_field_value_query("order_id", order_id, None);
        self.get_invoices(ListOptions::new().query(query))
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// List orders.
    ///
    /// A `status` (e.g. `"awaiting_shipping"`) replaces the query of `options`;
    /// `status_condition_type` defaults to Magento's `eq`.
    pub fn get_orders(
        &self,
        status: Option<&str>,
        status_condition_type: Option<&str>,
        mut options: ListOptions,
    ) -> EntityStream<'_> {
        if let Some(status) = status {
            options.query = Some(make_field_value_query(
                "status",
                status,
                status_condition_type,
            ));
        }
        self.paginate("/V1/orders", options)
    }

    /// The `limit` most recent orders, by decreasing increment id
    pub async fn get_last_orders(&self, limit: usize) -> Result<Vec<Entity>> {
        let query = make_search_query(
            Vec::<Vec<Filter>>::new(),
            &[SortOrder::desc("increment_id")],
        );
        self.get_orders(None, None, ListOptions::new().query(query).limit(limit))
            .try_collect()
            .await
    }

    /// Order items, optionally filtered on SKU.
    ///
    /// A query in `options` takes precedence over `sku`.
    pub fn get_orders_items(&self, sku: Option<&str>, mut options: ListOptions) -> EntityStream<'_> {
        if options.query.is_none() {
            options.query = sku.map(|sku| make_field_value_query("sku", sku, None));
        }
        self.paginate("/V1/orders/items", options)
    }

    /// An order by entity id
    pub async fn get_order(&self, order_id: impl Display) -> Result<Entity> {
        self.get_json(&format!("/V1/orders/{order_id}"), None).await
    }

    /// An order by increment id; `None` if it doesn't exist
    pub async fn get_order_by_increment_id(&self, increment_id: &str) -> Result<Option<Entity>> {
        let query = make_field_value_query("increment_id", increment_id, None);
        first(self.get_orders(None, None, ListOptions::new().query(query).limit(1))).await
    }

    /// Hold an order (entity id, not increment id)
    pub async fn hold_order(&self, order_id: impl Display) -> Result<ApiResponse> {
        self.post_api(&format!("/V1/orders/{order_id}/hold"), RequestOptions::new())
            .await
    }

    pub async fn unhold_order(&self, order_id: impl Display) -> Result<ApiResponse> {
        self.post_api(&format!("/V1/orders/{order_id}/unhold"), RequestOptions::new())
            .await
    }

    pub async fn save_order(&self, order: Entity) -> Result<ApiResponse> {
        self.post_api(
            "/V1/orders",
            RequestOptions::new().json(json!({ "entity": order })),
        )
        .await
    }

    /// Change the status of an order and optionally its `ext_order_id`.
    ///
    /// `increment_id` is sent back, otherwise Magento regenerates it.
    pub async fn set_order_status(
        &self,
        order: &Entity,
        status: &str,
        external_order_id: Option<&str>,
    ) -> Result<ApiResponse> {
        let mut payload = json!({
            "entity_id": required_field(order, "entity_id")?,
            "status": status,
            "increment_id": required_field(order, "increment_id")?,
        });
        if let Some(external_order_id) = external_order_id {
            payload["ext_order_id"] = json!(external_order_id);
        }
        self.save_order(payload).await
    }

    // ========================================================================
    // Shipments
    // ========================================================================

    pub fn get_shipments(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/shipments", options)
    }

    pub async fn ship_order(&self, order_id: impl Display, payload: Entity) -> Result<ApiResponse> {
        self.post_api(
            &format!("/V1/order/{order_id}/ship"),
            RequestOptions::new().json(payload),
        )
        .await
    }

    pub fn get_order_shipments(&self, order_id: impl Into<JsonValue>) -> EntityStream<'_> {
        let query = make_field_value_query("order_id", order_id, None);
        self.get_shipments(ListOptions::new().query(query))
    }
}
