//! HTTP transport for the remote contract (requires the `http` feature).
//!
//! Sends each [`RemoteRequest`] as a JSON request against a base URL. A
//! non-2xx response becomes a [`RemoteError`] with the response status and
//! the server's `error`/`message` field when the body carries one.

use std::time::Duration;

use serde_json::Value;

use super::{Method, Remote, RemoteError, RemoteRequest};
use crate::config::ClientConfig;

/// Remote backed by a reqwest client.
#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Create a remote for the given base URL (e.g., `http://127.0.0.1:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a remote from client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RemoteError::new(format!("http client setup failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

impl Remote for HttpRemote {
    async fn call(&self, request: &RemoteRequest) -> Result<Value, RemoteError> {
        let url = self.url(&request.endpoint);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = match &request.payload {
            Some(payload) => builder.json(payload),
            None => builder,
        };

        log::debug!("http {}", request);
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::new(format!("{} failed: {}", request, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::with_status(status.as_u16(), e.to_string()))?;
        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };

        if status.is_success() {
            Ok(value)
        } else {
            Err(RemoteError::with_status(
                status.as_u16(),
                error_message(&value, status.canonical_reason().unwrap_or("request failed")),
            ))
        }
    }
}

fn error_message(body: &Value, default: &str) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .or_else(|| body.as_str())
        .unwrap_or(default)
        .to_string()
}
