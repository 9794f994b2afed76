//! Error types for the Magento client
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Remote failures come in two shapes: [`ApiError`] when Magento answered
//! with its JSON error envelope, and [`Error::HttpStatus`] otherwise.

use crate::http::ApiResponse;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Placeholders in Magento error messages: `%1`, `%2`, `%name`
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z0-9_]+)").expect("placeholder regex is valid"));

/// The main error type for the Magento client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("{0}")]
    Api(Box<ApiError>),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid API path '{path}': must start with /V1/")]
    InvalidPath { path: String },

    #[error("Read-only client refused {method} {path}")]
    ReadOnly { method: String, path: String },

    // ============================================================================
    // Data Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Assertion failed: {message}")]
    Assertion { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an assertion error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// HTTP status of the failed response, for remote errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Api(err) => Some(err.response.status().as_u16()),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a 404 from the API
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Structured Magento error, if the response carried one
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(Box::new(err))
    }
}

/// Error envelope returned by Magento: `{"message": ..., "parameters": ..., "trace": ...}`
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Raw message, possibly containing `%1` / `%name` placeholders
    pub message: String,
    /// Placeholder values (list or object)
    pub parameters: Option<Value>,
    /// Server-side stack trace, only present in developer mode
    pub trace: Option<String>,
    /// The response this error was read from
    pub response: ApiResponse,
}

impl ApiError {
    /// Create an error without parameters or trace
    pub fn new(message: impl Into<String>, response: ApiResponse) -> Self {
        Self {
            message: message.into(),
            parameters: None,
            trace: None,
            response,
        }
    }

    /// Set the placeholder parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Message with its placeholders substituted
    pub fn formatted_message(&self) -> String {
        format_message(&self.message, self.parameters.as_ref())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_message())
    }
}

impl std::error::Error for ApiError {}

/// Substitute Magento message placeholders.
///
/// List parameters fill `%1`, `%2`, ... (1-based); object parameters fill
/// `%key`. Unknown placeholders are kept as-is. Parameters of any other
/// shape are appended in parentheses.
pub fn format_message(message: &str, parameters: Option<&Value>) -> String {
    let lookup = |key: &str| -> Option<String> {
        let value = match parameters? {
            Value::Array(items) => {
                let index = key.parse::<usize>().ok()?.checked_sub(1)?;
                items.get(index)?
            }
            Value::Object(map) => map.get(key)?,
            _ => return None,
        };
        Some(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };

    match parameters {
        None | Some(Value::Null) => message.to_string(),
        Some(Value::Array(_) | Value::Object(_)) => PLACEHOLDER_REGEX
            .replace_all(message, |caps: &regex::Captures<'_>| {
                lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned(),
        Some(other) => format!("{message} ({other})"),
    }
}

/// Result type alias for the Magento client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
