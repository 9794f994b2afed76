//! Fully-read API responses and error mapping

use crate::error::{ApiError, Error, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response whose body has already been read.
///
/// Keeping the body in memory lets errors carry the response that caused
/// them and lets callers inspect failures without consuming anything.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    /// Build a response snapshot
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Read a reqwest response to completion
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(Self::new(status, headers, body))
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::decode(format!(
                "invalid JSON in {} response: {e}",
                self.status.as_u16()
            ))
        })
    }

    /// Magento error envelope, if the body is a JSON object with a `message`
    fn error_envelope(&self) -> Option<ApiError> {
        if !self.body.starts_with('{') {
            return None;
        }
        let Ok(Value::Object(mut body)) = serde_json::from_str::<Value>(&self.body) else {
            return None;
        };
        let message = match body.remove("message")? {
            Value::String(message) => message,
            other => other.to_string(),
        };
        let parameters = body.remove("parameters").filter(|p| !p.is_null());
        let trace = body.remove("trace").and_then(|t| match t {
            Value::String(trace) => Some(trace),
            Value::Null => None,
            other => Some(other.to_string()),
        });

        Some(ApiError {
            message,
            parameters,
            trace,
            response: self.clone(),
        })
    }
}

/// Turn a failed response into an error.
///
/// Success passes through. A JSON body with a `message` key becomes
/// [`Error::Api`]; anything else becomes [`Error::HttpStatus`].
pub fn raise_for_response(response: &ApiResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    if let Some(err) = response.error_envelope() {
        return Err(err.into());
    }

    Err(Error::http_status(
        response.status().as_u16(),
        response.text(),
    ))
}
