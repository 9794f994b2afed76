//! Customers and customer groups

use crate::error::Result;
use crate::http::MagentoClient;
use crate::pagination::{EntityStream, ListOptions};
use crate::types::Entity;

impl MagentoClient {
    pub fn get_customers(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/customers/search", options)
    }

    pub async fn get_customer(&self, customer_id: u64) -> Result<Entity> {
        self.get_json(&format!("/V1/customers/{customer_id}"), None)
            .await
    }

    pub fn get_customer_groups(&self, options: ListOptions) -> EntityStream<'_> {
        self.paginate("/V1/customerGroups/search", options)
    }
}
