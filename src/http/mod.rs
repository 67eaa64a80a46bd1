//! Shared HTTP client for the notes API.
//!
//! One `ApiClient` is built per process with a fixed base address and request
//! timeout. Failures are mapped onto [`ClientError`]:
//! - timeouts are logged and returned as `Timeout`
//! - other transport failures become `Transport`
//! - non-2xx responses become `Api` with the server's `detail`, if any
//!
//! Nothing is retried.

use crate::config::Config;
use crate::error::ClientError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Headers that authenticate a request with `token`.
///
/// Pure transform: always exactly one `Authorization: Bearer <token>` pair.
pub fn with_auth_headers(token: &str) -> Vec<(&'static str, String)> {
    vec![("Authorization", format!("Bearer {token}"))]
}

/// Per-request query parameters and extra headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying only the bearer header for `token`.
    pub fn authorized(token: &str) -> Self {
        Self::new().headers(with_auth_headers(token))
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub db: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Preconfigured request sender for the notes API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client for `base_url`. A trailing slash is ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            base_url: base_url.to_string(),
            timeout,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ── Verbs ────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let response = self.send::<()>(Method::GET, path, None, options).await?;
        self.decode(&Method::GET, path, response).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, body, options).await?;
        self.decode(&Method::POST, path, response).await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, path, body, options).await?;
        self.decode(&Method::PUT, path, response).await
    }

    /// `DELETE`; any response body is read and discarded.
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<(), ClientError> {
        let response = self.send::<()>(Method::DELETE, path, None, options).await?;
        response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&Method::DELETE, path, e))?;
        Ok(())
    }

    /// Check whether the API (and its database) is reachable.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get("/health", RequestOptions::new()).await
    }

    // ── Internals ────────────────────────────────────────────────

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<reqwest::Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header(CONTENT_TYPE, "application/json");

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (key, value) in &options.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "Sending API request");

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&method, path, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&method, path, e))?;
        tracing::debug!(%method, path, status = status.as_u16(), "API returned an error");
        Err(ClientError::Api {
            status: status.as_u16(),
            message: extract_detail(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(method, path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn transport_error(&self, method: &Method, path: &str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            tracing::warn!(
                "Request timeout after {}s ({method} {path}) - check if the API at {} is running",
                self.timeout.as_secs_f32(),
                self.base_url
            );
            return ClientError::Timeout {
                method: method.to_string(),
                path: path.to_string(),
            };
        }
        ClientError::Transport(err)
    }
}

/// Pull the human-readable `detail` out of an error body.
///
/// Handles both a plain string and a validation-error list
/// (`[{"msg": ...}, ...]`), whose messages are joined.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
