//! Store configs, groups, views and websites

use crate::error::{Error, Result};
use crate::http::MagentoClient;
use crate::types::{Entity, Query};

/// Integer field of a store record
fn id_field(record: &Entity, field: &str) -> Result<i64> {
    record
        .get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| Error::decode(format!("store record has no integer '{field}'")))
}

fn has_code(record: &Entity, code: &str) -> bool {
    record.get("code").and_then(serde_json::Value::as_str) == Some(code)
}

impl MagentoClient {
    /// Store configs, optionally restricted to some store codes
    pub async fn get_store_configs(&self, store_codes: &[&str]) -> Result<Vec<Entity>> {
        let query = (!store_codes.is_empty()).then(|| Query::new().with("storeCodes", store_codes));
        Ok(self
            .get_json_api("/V1/store/storeConfigs", query)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_store_groups(&self) -> Result<Vec<Entity>> {
        Ok(self
            .get_json_api("/V1/store/storeGroups", None)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_store_views(&self) -> Result<Vec<Entity>> {
        Ok(self
            .get_json_api("/V1/store/storeViews", None)
            .await?
            .unwrap_or_default())
    }

    pub async fn get_websites(&self) -> Result<Vec<Entity>> {
        Ok(self
            .get_json_api("/V1/store/websites", None)
            .await?
            .unwrap_or_default())
    }

    /// Store group of the client scope.
    ///
    /// The scope is looked up as a store group code, then a website code
    /// (its default group), then a store view code.
    pub async fn get_current_store_group_id(&self) -> Result<i64> {
        for group in self.get_store_groups().await? {
            if has_code(&group, self.scope()) {
                return id_field(&group, "id");
            }
        }
        self.store_group_id_from_website_or_view().await
    }

    async fn store_group_id_from_website_or_view(&self) -> Result<i64> {
        for website in self.get_websites().await? {
            if has_code(&website, self.scope()) {
                return id_field(&website, "default_group_id");
            }
        }

        for view in self.get_store_views().await? {
            if has_code(&view, self.scope()) {
                return id_field(&view, "store_group_id");
            }
        }

        Err(Error::config(format!(
            "can't determine the store group of scope '{}'",
            self.scope()
        )))
    }

    /// Root category of the client scope
    pub async fn get_root_category_id(&self) -> Result<i64> {
        let groups = self.get_store_groups().await?;

        if let Some(group) = groups.iter().find(|group| has_code(group, self.scope())) {
            return id_field(group, "root_category_id");
        }

        let group_id = self.store_group_id_from_website_or_view().await?;
        for group in &groups {
            if id_field(group, "id")? == group_id {
                return id_field(group, "root_category_id");
            }
        }

        Err(Error::config(format!(
            "store group {group_id} of scope '{}' not found",
            self.scope()
        )))
    }
}
