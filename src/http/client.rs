//! Magento REST client and request executor
//!
//! Every call goes through [`MagentoClient::request`], which:
//! - Prefixes the path with `/rest/{scope}` (and `/async/bulk` on demand)
//! - Sends the bearer token and user agent configured at construction
//! - Retries failed responses a caller-chosen number of times, with a fixed delay
//! - Maps failures to errors when asked to

use super::response::{raise_for_response, ApiResponse};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Query};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Prefix every API path must start with
pub const API_PATH_PREFIX: &str = "/V1/";

/// Everything but RFC 3986 unreserved characters; `/` included
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Options for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters
    pub query: Option<Query>,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
    /// Number of times a failed response is retried
    pub retry: u32,
    /// Turn a failed final response into an error
    pub raise_on_error: bool,
    /// Route through the `/async/bulk` endpoints
    pub async_bulk: bool,
    /// Send even when the client is read-only
    pub bypass_read_only: bool,
}

impl RequestOptions {
    /// Create default options: no body, no retry, no error raising
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that raise on a failed response
    pub fn raising() -> Self {
        Self::new().raise_on_error(true)
    }

    /// Set query parameters
    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the retry count
    #[must_use]
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Raise on a failed response
    #[must_use]
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Use the async bulk endpoint prefix
    #[must_use]
    pub fn async_bulk(mut self) -> Self {
        self.async_bulk = true;
        self
    }

    /// Allow this (read-like) write request on a read-only client
    #[must_use]
    pub fn bypass_read_only(mut self) -> Self {
        self.bypass_read_only = true;
        self
    }
}

/// Percent-encode a value used as a single path segment (SKUs, codes, ...)
pub fn escape_path(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Client for the Magento REST API
pub struct MagentoClient {
    client: Client,
    config: ClientConfig,
    base_url: String,
}

impl MagentoClient {
    /// Create a client; fails if the base URL or token is missing
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| Error::invalid_value("token", "not a valid header value"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Create a client from `MAGENTO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Store scope of this client
    pub fn scope(&self) -> &str {
        &self.config.scope
    }

    /// Page size used by paginated requests
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Full URL for an API path
    pub fn api_url(&self, path: &str, async_bulk: bool) -> String {
        format!("{}{}", self.base_url, self.full_path(path, async_bulk))
    }

    fn full_path(&self, path: &str, async_bulk: bool) -> String {
        let bulk = if async_bulk { "/async/bulk" } else { "" };
        format!("/rest/{}{bulk}{path}", self.config.scope)
    }

    /// Issue a request against an API path (`/V1/...`).
    ///
    /// Failed responses are retried `options.retry` times, waiting the
    /// configured retry delay before each attempt. Transport errors are
    /// returned immediately.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        if !path.starts_with(API_PATH_PREFIX) {
            return Err(Error::InvalidPath {
                path: path.to_string(),
            });
        }

        let full_path = self.full_path(path, options.async_bulk);

        if self.config.read_only && method != Method::GET && !options.bypass_read_only {
            warn!(%method, path = %full_path, "Read-only mode: request not sent");
            return Err(Error::ReadOnly {
                method: method.to_string(),
                path: full_path,
            });
        }

        let url = format!("{}{full_path}", self.base_url);
        debug!(%method, path = %full_path, "Magento API request");

        let mut response = self.send(&method, &url, &options).await?;
        let mut remaining = options.retry;
        let delay = self.config.retry_delay();

        while !response.is_success() && remaining > 0 {
            remaining -= 1;
            warn!(
                status = response.status().as_u16(),
                remaining,
                "{} {} failed, retrying in {:?}",
                method,
                full_path,
                delay
            );
            tokio::time::sleep(delay).await;
            response = self.send(&method, &url, &options).await?;
        }

        if options.raise_on_error {
            raise_for_response(&response)?;
        }
        Ok(response)
    }

    /// Send one attempt and read the body
    async fn send(&self, method: &Method, url: &str, options: &RequestOptions) -> Result<ApiResponse> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(query) = &options.query {
            req = req.query(&query.to_pairs());
        }

        if let Some(body) = &options.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        ApiResponse::read(response).await
    }

    /// GET an API path
    pub async fn get_api(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::GET, path, options).await
    }

    /// POST to an API path
    pub async fn post_api(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::POST, path, options).await
    }

    /// PUT to an API path
    pub async fn put_api(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::PUT, path, options).await
    }

    /// DELETE an API path
    pub async fn delete_api(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, options).await
    }

    /// GET an API path, raise on failure and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: Option<Query>) -> Result<T> {
        let mut options = RequestOptions::raising();
        options.query = query;
        self.get_api(path, options).await?.json()
    }

    /// GET an API path and decode the JSON body; `None` on 404
    pub async fn get_json_api<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<Query>,
    ) -> Result<Option<T>> {
        let mut options = RequestOptions::new();
        options.query = query;
        let response = self.get_api(path, options).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        raise_for_response(&response)?;
        response.json().map(Some)
    }

    /// Send a JSON body, raise on failure and decode the JSON answer
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: JsonValue,
    ) -> Result<T> {
        self.request(method, path, RequestOptions::raising().json(body))
            .await?
            .json()
    }

    /// Retry delay configured for this client
    pub fn retry_delay(&self) -> Duration {
        self.config.retry_delay()
    }
}

impl std::fmt::Debug for MagentoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagentoClient")
            .field("base_url", &self.base_url)
            .field("scope", &self.config.scope)
            .field("read_only", &self.config.read_only)
            .finish_non_exhaustive()
    }
}
