//! Categories

use super::first;
use crate::error::Result;
use crate::http::{ApiResponse, MagentoClient, RequestOptions};
use crate::pagination::{EntityStream, ListOptions};
use crate::query::make_field_value_query;
use crate::types::Entity;
use reqwest::Method;
use serde_json::json;
use std::fmt::Display;

impl MagentoClient {
    pub fn get_categories(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/categories/list", options)
    }

    pub async fn get_category(&self, category_id: impl Display) -> Result<Option<Entity>> {
        self.get_json_api(&format!("/V1/categories/{category_id}"), None)
            .await
    }

    /// First category with exactly this name
    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<Entity>> {
        let query = make_field_value_query("name", name, None);
        first(self.get_categories(ListOptions::new().query(query))).await
    }

    /// Update a category with (partial) data and return the updated record
    pub async fn update_category(&self, category_id: impl Display, category: Entity) -> Result<Entity> {
        self.send_json(
            Method::PUT,
            &format!("/V1/categories/{category_id}"),
            json!({ "category": category }),
        )
        .await
    }

    pub async fn create_category(&self, category: Entity) -> Result<ApiResponse> {
        self.post_api(
            "/V1/categories",
            RequestOptions::new().json(json!({ "category": category })),
        )
        .await
    }
}
