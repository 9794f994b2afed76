//! Batched lookups and batched product saves
//!
//! [`BatchGetter`] fetches entities for a long list of values with one
//! `in`-filtered listing per batch. [`ProductBatchSaver`] buffers product
//! updates and sends them through the async bulk API.

use crate::error::Result;
use crate::http::MagentoClient;
use crate::pagination::{EntityStream, ListOptions};
use crate::query::{Filter, SearchQuery};
use crate::types::{Entity, Query};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

/// Default number of values per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Listing called with the query of a batch and its size as limit
pub type BatchListing<'a> = Box<dyn Fn(Query, usize) -> EntityStream<'a> + Send + 'a>;

/// Lazily fetch the entities whose `field` is in a list of values
pub struct BatchGetter<'a> {
    listing: BatchListing<'a>,
    field: String,
    values: Vec<String>,
    batch_size: usize,
}

impl<'a> BatchGetter<'a> {
    pub fn new<F, I, V>(listing: F, field: impl Into<String>, values: I) -> Self
    where
        F: Fn(Query, usize) -> EntityStream<'a> + Send + 'a,
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self {
            listing: Box::new(listing),
            field: field.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Batches over a paginated endpoint of `client`
    pub fn listing<I, V>(
        client: &'a MagentoClient,
        path: impl Into<String>,
        field: impl Into<String>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let path = path.into();
        Self::new(
            move |query, limit| {
                client.paginate(path.clone(), ListOptions::new().query(query).limit(limit))
            },
            field,
            values,
        )
    }

    /// Products by SKU
    pub fn products<I, V>(client: &'a MagentoClient, skus: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::new(
            move |query, limit| client.get_products(ListOptions::new().query(query).limit(limit)),
            "sku",
            skus,
        )
    }

    /// Set the number of values per batch (at least 1)
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Number of listings this getter will issue
    pub fn batch_count(&self) -> usize {
        self.values.len().div_ceil(self.batch_size)
    }

    /// Stream the entities of every batch, one batch listing at a time
    pub fn into_stream(self) -> EntityStream<'a> {
        let Self {
            listing,
            field,
            values,
            batch_size,
        } = self;

        let batches: Vec<Vec<String>> = values.chunks(batch_size).map(<[String]>::to_vec).collect();
        let batch_count = batches.len();

        Box::pin(
            stream::iter(batches.into_iter().enumerate())
                .map(move |(index, batch)| {
                    debug!(field = %field, "batch {}/{}", index + 1, batch_count);
                    let limit = batch.len();
                    let query = SearchQuery::new()
                        .filter(Filter::is_in(field.as_str(), &batch))
                        .build();
                    listing(query, limit)
                })
                .flatten(),
        )
    }
}

impl std::fmt::Debug for BatchGetter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchGetter")
            .field("field", &self.field)
            .field("values", &self.values.len())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

/// Outcome of a [`ProductBatchSaver`]
#[derive(Debug, Clone, Default)]
pub struct BatchSaveReport {
    /// Products sent
    pub sent_items: usize,
    /// Bulk requests sent
    pub sent_batches: usize,
    /// Bulk operation answers (`bulk_uuid`, `request_items`, ...)
    pub responses: Vec<Entity>,
}

/// Buffer product updates and send them as async bulk updates.
///
/// A batch is sent each time the buffer is full; call [`finish`](Self::finish)
/// to send the rest.
pub struct ProductBatchSaver<'a> {
    client: &'a MagentoClient,
    batch_size: usize,
    buffer: Vec<Entity>,
    report: BatchSaveReport,
}

impl<'a> ProductBatchSaver<'a> {
    pub fn new(client: &'a MagentoClient) -> Self {
        Self {
            client,
            batch_size: DEFAULT_BATCH_SIZE,
            buffer: Vec::new(),
            report: BatchSaveReport::default(),
        }
    }

    /// Set the number of products per bulk request (at least 1)
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Queue a product update; it must carry its `sku`
    pub async fn add(&mut self, product: Entity) -> Result<()> {
        self.buffer.push(product);
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn add_all<I>(&mut self, products: I) -> Result<()>
    where
        I: IntoIterator<Item = Entity>,
    {
        for product in products {
            self.add(product).await?;
        }
        Ok(())
    }

    /// Send the buffered products now.
    ///
    /// On failure the products stay buffered.
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .async_update_products(self.buffer.iter().cloned())
            .await?;
        let count = self.buffer.len();
        self.buffer.clear();

        self.report.sent_items += count;
        self.report.sent_batches += 1;
        info!(
            items = count,
            batches = self.report.sent_batches,
            "Sent product batch"
        );
        self.report.responses.push(response);
        Ok(())
    }

    /// Products waiting for the next batch
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn sent_items(&self) -> usize {
        self.report.sent_items
    }

    pub fn sent_batches(&self) -> usize {
        self.report.sent_batches
    }

    /// Send the remaining products and return the report
    pub async fn finish(mut self) -> Result<BatchSaveReport> {
        self.flush().await?;
        Ok(std::mem::take(&mut self.report))
    }
}

impl Drop for ProductBatchSaver<'_> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            warn!(
                pending = self.buffer.len(),
                "ProductBatchSaver dropped with unsent products"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::query::PAGE_SIZE_KEY;
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIELD_KEY: &str = "searchCriteria[filter_groups][0][filters][0][field]";
    const VALUE_KEY: &str = "searchCriteria[filter_groups][0][filters][0][value]";
    const CONDITION_KEY: &str = "searchCriteria[filter_groups][0][filters][0][condition_type]";

    fn client(base_url: &str, read_only: bool) -> MagentoClient {
        let config = ClientConfig::builder()
            .base_url(base_url)
            .token("123")
            .scope("toto")
            .read_only(read_only)
            .build()
            .unwrap();
        MagentoClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_batch_getter() {
        let listing = |query: Query, limit: usize| -> EntityStream<'static> {
            assert_eq!(limit, 2);
            assert_eq!(query.get(CONDITION_KEY), Some(&json!("in")));
            assert_eq!(query.get(FIELD_KEY), Some(&json!("myfield")));
            let values: Vec<Result<Entity>> = query
                .get(VALUE_KEY)
                .and_then(Value::as_str)
                .unwrap()
                .split(',')
                .map(|n| Ok(json!(n.parse::<i64>().unwrap() * 2)))
                .collect();
            Box::pin(stream::iter(values))
        };

        let getter = BatchGetter::new(listing, "myfield", 0..20).batch_size(2);
        assert_eq!(getter.batch_count(), 10);

        let items: Vec<Entity> = getter.into_stream().try_collect().await.unwrap();
        let expected: Vec<Entity> = (0..40).step_by(2).map(|n| json!(n)).collect();
        assert_eq!(items, expected);
    }

    #[tokio::test]
    async fn test_product_batch_getter_empty() {
        let server = MockServer::start().await;
        let client = client(&server.uri(), true);

        let items: Vec<Entity> = BatchGetter::products(&client, Vec::<String>::new())
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert!(items.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_batch_getter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/toto/V1/products"))
            .and(query_param(VALUE_KEY, "A,B"))
            .and(query_param(PAGE_SIZE_KEY, "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"sku": "A"}, {"sku": "B"}],
                "total_count": 2,
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/toto/V1/products"))
            .and(query_param(VALUE_KEY, "C"))
            .and(query_param(PAGE_SIZE_KEY, "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [],
                "total_count": 0,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri(), true);
        let items: Vec<Entity> = BatchGetter::products(&client, ["A", "B", "C"])
            .batch_size(2)
            .into_stream()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items, vec![json!({"sku": "A"}), json!({"sku": "B"})]);
    }

    #[tokio::test]
    async fn test_product_batch_saver_empty() {
        let client = client("https://example.com", true);
        let saver = ProductBatchSaver::new(&client);

        let report = saver.finish().await.unwrap();
        assert_eq!(report.sent_items, 0);
        assert_eq!(report.sent_batches, 0);
    }

    #[tokio::test]
    async fn test_product_batch_saver() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/rest/toto/async/bulk/V1/products/bySku"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "bulk_uuid": "b-1",
                "errors": false,
            })))
            .expect(3)
            .mount(&server)
            .await;

        let client = client(&server.uri(), false);
        let mut saver = ProductBatchSaver::new(&client).batch_size(2);

        saver
            .add_all((1..=5).map(|n| json!({"sku": format!("S{n}"), "price": n})))
            .await
            .unwrap();
        assert_eq!(saver.sent_items(), 4);
        assert_eq!(saver.sent_batches(), 2);
        assert_eq!(saver.pending(), 1);

        let report = saver.finish().await.unwrap();
        assert_eq!(report.sent_items, 5);
        assert_eq!(report.sent_batches, 3);
        assert_eq!(report.responses.len(), 3);

        let requests = server.received_requests().await.unwrap();
        let last: Value = serde_json::from_slice(&requests[2].body).unwrap();
        assert_eq!(last, json!([{"product": {"sku": "S5", "price": 5}}]));
    }

    #[tokio::test]
    async fn test_product_batch_saver_read_only() {
        let client = client("https://example.com", true);
        let mut saver = ProductBatchSaver::new(&client).batch_size(1);

        let err = saver.add(json!({"sku": "A"})).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::ReadOnly { .. }));
        assert_eq!(saver.sent_items(), 0);
        assert_eq!(saver.pending(), 1);
    }
}
