//! Product attributes, attribute sets and attribute options

use crate::error::{Error, Result};
use crate::http::{escape_path, ApiResponse, MagentoClient, RequestOptions};
use crate::pagination::{EntityStream, ListOptions};
use crate::types::{Entity, JsonObject, JsonValue};
use reqwest::Method;
use serde_json::json;
use std::fmt::Display;
use std::sync::LazyLock;

/// Fields merged under every attribute saved with defaults.
///
/// `scope` is `global` so the attribute can drive configurable products.
pub static DEFAULT_ATTRIBUTE: LazyLock<JsonObject> = LazyLock::new(|| {
    [
        ("apply_to", json!([])),
        ("backend_type", json!("int")),
        ("custom_attributes", json!([])),
        ("entity_type_id", json!("4")),
        ("extension_attributes", json!({})),
        ("frontend_input", json!("select")),
        ("is_comparable", json!(false)),
        ("is_filterable", json!(false)),
        ("is_filterable_in_grid", json!(false)),
        ("is_filterable_in_search", json!(false)),
        ("is_html_allowed_on_front", json!(false)),
        ("is_required", json!(false)),
        ("is_searchable", json!(false)),
        ("is_unique", json!(false)),
        ("is_used_for_promo_rules", json!(false)),
        ("is_used_in_grid", json!(false)),
        ("is_user_defined", json!(true)),
        ("is_visible", json!(true)),
        ("is_visible_in_advanced_search", json!(false)),
        ("is_visible_in_grid", json!(false)),
        ("is_visible_on_front", json!(true)),
        ("is_wysiwyg_enabled", json!(false)),
        ("note", json!("")),
        ("position", json!(0)),
        ("scope", json!("global")),
        ("used_for_sort_by", json!(false)),
        ("used_in_product_listing", json!(false)),
        ("validation_rules", json!([])),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
});

impl MagentoClient {
    // ========================================================================
    // Attributes
    // ========================================================================

    /// Save a product attribute.
    ///
    /// With `with_defaults`, the attribute is laid over [`DEFAULT_ATTRIBUTE`].
    pub async fn save_attribute(&self, attribute: Entity, with_defaults: bool) -> Result<Entity> {
        let attribute = if with_defaults {
            let JsonValue::Object(fields) = attribute else {
                return Err(Error::assertion("attribute must be a JSON object"));
            };
            let mut merged = DEFAULT_ATTRIBUTE.clone();
            merged.extend(fields);
            JsonValue::Object(merged)
        } else {
            attribute
        };

        self.send_json(
            Method::POST,
            "/V1/products/attributes",
            json!({ "attribute": attribute }),
        )
        .await
    }

    pub async fn delete_attribute(&self, attribute_code: &str) -> Result<ApiResponse> {
        let path = format!("/V1/products/attributes/{}", escape_path(attribute_code));
        self.delete_api(&path, RequestOptions::new()).await
    }

    // ========================================================================
    // Attribute sets
    // ========================================================================

    pub fn get_attribute_sets(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/eav/attribute-sets/list", options)
    }

    /// All attributes of an attribute set; `None` if the set doesn't exist
    pub async fn get_attribute_set_attributes(
        &self,
        attribute_set_id: u64,
    ) -> Result<Option<Vec<Entity>>> {
        let path = format!("/V1/products/attribute-sets/{attribute_set_id}/attributes");
        self.get_json_api(&path, None).await
    }

    /// Add an attribute to a group of an attribute set
    pub async fn assign_attribute_set_attribute(
        &self,
        attribute_set_id: u64,
        attribute_group_id: u64,
        attribute_code: &str,
        sort_order: i64,
    ) -> Result<ApiResponse> {
        let payload = json!({
            "attributeCode": attribute_code,
            "attributeGroupId": attribute_group_id,
            "attributeSetId": attribute_set_id,
            "sortOrder": sort_order,
        });
        self.post_api(
            "/V1/products/attribute-sets/attributes",
            RequestOptions::new().json(payload),
        )
        .await
    }

    pub async fn remove_attribute_set_attribute(
        &self,
        attribute_set_id: u64,
        attribute_code: &str,
    ) -> Result<ApiResponse> {
        let path = format!(
            "/V1/products/attribute-sets/{attribute_set_id}/attributes/{}",
            escape_path(attribute_code)
        );
        self.delete_api(&path, RequestOptions::new()).await
    }

    // ========================================================================
    // Attribute options
    // ========================================================================

    pub async fn get_products_attribute_options(&self, attribute_code: &str) -> Result<Vec<Entity>> {
        let path = format!("/V1/products/attributes/{}/options", escape_path(attribute_code));
        self.get_json(&path, None).await
    }

    /// Add an option (`label`/`value`) to an attribute and return its id.
    ///
    /// Magento answers `"id_123"`; the `id_` prefix is stripped.
    pub async fn add_products_attribute_option(
        &self,
        attribute_code: &str,
        option: Entity,
    ) -> Result<String> {
        let path = format!("/V1/products/attributes/{}/options", escape_path(attribute_code));
        let id: JsonValue = self
            .send_json(Method::POST, &path, json!({ "option": option }))
            .await?;

        let id = match id {
            JsonValue::String(s) => s,
            other => other.to_string(),
        };
        Ok(id.strip_prefix("id_").map(str::to_string).unwrap_or(id))
    }

    pub async fn delete_products_attribute_option(
        &self,
        attribute_code: &str,
        option_id: impl Display,
    ) -> Result<bool> {
        let path = format!(
            "/V1/products/attributes/{}/options/{option_id}",
            escape_path(attribute_code)
        );
        self.delete_api(&path, RequestOptions::raising()).await?.json()
    }

    /// Options of the `manufacturer` attribute
    pub async fn get_manufacturers(&self) -> Result<Vec<Entity>> {
        self.get_products_attribute_options("manufacturer").await
    }
}
