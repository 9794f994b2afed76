//! Client configuration
//!
//! A [`ClientConfig`] is resolved once at startup, either built explicitly,
//! read from `MAGENTO_*` environment variables, or loaded from a YAML/JSON
//! file, and is never mutated afterwards.

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Scope used when none is configured
pub const DEFAULT_SCOPE: &str = "all";

/// Default number of items requested per page.
///
/// Larger pages barely reduce total time on big catalogs, and stores may
/// enforce a hard maximum.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default delay between retries, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 10_000;

/// Environment variable prefix used by [`ClientConfig::from_env`]
pub const ENV_PREFIX: &str = "MAGENTO_";

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_user_agent() -> String {
    format!("magento-client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

/// Configuration for a [`MagentoClient`](crate::http::MagentoClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Magento instance, e.g. `https://shop.example.com`
    #[serde(default)]
    pub base_url: String,

    /// Integration access token
    #[serde(default)]
    pub token: String,

    /// Store scope prefixed into every path (`all`, a store view code, ...)
    #[serde(default = "default_scope")]
    pub scope: String,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Items per page for paginated endpoints
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Delay between retries of a failed request
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Transport timeout per request; none unless configured
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Refuse to send write requests
    #[serde(default)]
    pub read_only: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            scope: default_scope(),
            user_agent: default_user_agent(),
            page_size: default_page_size(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: None,
            read_only: false,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("scope", &self.scope)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read the configuration from `MAGENTO_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

        let mut builder = Self::builder();
        if let Some(base_url) = var("BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Some(token) = var("TOKEN") {
            builder = builder.token(token);
        }
        if let Some(scope) = var("SCOPE") {
            builder = builder.scope(scope);
        }
        if let Some(user_agent) = var("USER_AGENT") {
            builder = builder.user_agent(user_agent);
        }
        if let Some(page_size) = var("PAGE_SIZE") {
            let page_size = page_size
                .parse()
                .map_err(|_| Error::invalid_value("page_size", format!("not a number: {page_size}")))?;
            builder = builder.page_size(page_size);
        }
        builder.build()
    }

    /// Load and validate the configuration from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a YAML or JSON file without validating it.
    ///
    /// Callers layering overrides on top validate once they are applied.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Parse the configuration from YAML (JSON is accepted as well)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that mandatory fields are present and values are usable
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        if self.token.trim().is_empty() {
            return Err(Error::missing_field("token"));
        }
        url::Url::parse(&self.base_url)?;
        if self.scope.is_empty() || self.scope.contains('/') {
            return Err(Error::invalid_value("scope", format!("{:?}", self.scope)));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be positive"));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::invalid_value("timeout_secs", "must be positive"));
        }
        Ok(())
    }

    /// Delay between retries
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Transport timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the access token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the store scope
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.config.scope = scope.into();
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the page size for paginated requests
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Set the delay between retries
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the transport timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// Refuse write requests
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::builder()
            .base_url("https://shop.example.com")
            .token("secret")
            .build()
            .unwrap();

        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.retry_delay(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("magento-client/"));
        assert!(!config.read_only);
    }

    #[test]
    fn test_builder_missing_fields() {
        let err = ClientConfig::builder().token("secret").build().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "base_url"));

        let err = ClientConfig::builder()
            .base_url("https://shop.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "token"));
    }

    #[test]
    fn test_builder_invalid_values() {
        let err = ClientConfig::builder()
            .base_url("not a url")
            .token("secret")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = ClientConfig::builder()
            .base_url("https://shop.example.com")
            .token("secret")
            .page_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_from_lookup() {
        assert!(ClientConfig::from_lookup(lookup(&[])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("MAGENTO_TOKEN", "xx-token")])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup(&[("MAGENTO_BASE_URL", "https://xxxx")])).is_err()
        );

        let config = ClientConfig::from_lookup(lookup(&[
            ("MAGENTO_BASE_URL", "https://xxxx"),
            ("MAGENTO_TOKEN", "xx-token"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://xxxx");
        assert_eq!(config.token, "xx-token");
        assert_eq!(config.scope, DEFAULT_SCOPE);

        let config = ClientConfig::from_lookup(lookup(&[
            ("MAGENTO_BASE_URL", "https://xxxx"),
            ("MAGENTO_TOKEN", "xx-token"),
            ("MAGENTO_SCOPE", "abc"),
            ("MAGENTO_USER_AGENT", "hello I'm a test"),
            ("MAGENTO_PAGE_SIZE", "50"),
        ]))
        .unwrap();
        assert_eq!(config.scope, "abc");
        assert_eq!(config.user_agent, "hello I'm a test");
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_from_lookup_bad_page_size() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("MAGENTO_BASE_URL", "https://xxxx"),
            ("MAGENTO_TOKEN", "xx-token"),
            ("MAGENTO_PAGE_SIZE", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url: https://shop.example.com\ntoken: abc\nscope: default\npage_size: 200"
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scope, "default");
        assert_eq!(config.page_size, 200);
        assert_eq!(config.retry_delay_ms, DEFAULT_RETRY_DELAY_MS);
    }

    #[test]
    fn test_timeout_is_optional() {
        let config = ClientConfig::from_yaml_str("base_url: https://shop.example.com\ntoken: abc").unwrap();
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.timeout(), None);

        let config = ClientConfig::from_yaml_str(
            "base_url: https://shop.example.com\ntoken: abc\ntimeout_secs: 120",
        )
        .unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::from_yaml_str(
            "base_url: https://shop.example.com\ntoken: abc\ntimeout_secs: 0",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "timeout_secs"));
    }

    #[test]
    fn test_load_file_defers_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scope: fr").unwrap();

        let config = ClientConfig::load_file(file.path()).unwrap();
        assert_eq!(config.scope, "fr");
        assert!(config.base_url.is_empty());
        assert!(matches!(
            ClientConfig::from_file(file.path()),
            Err(Error::MissingConfigField { .. })
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }

    #[test]
    fn test_from_json_str() {
        let config = ClientConfig::from_yaml_str(
            r#"{"base_url": "https://shop.example.com", "token": "abc", "read_only": true}"#,
        )
        .unwrap();
        assert!(config.read_only);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::builder()
            .base_url("https://shop.example.com")
            .token("super-secret")
            .build()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
