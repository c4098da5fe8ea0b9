// src/core/service_client.rs
//! Shared HTTP plumbing for the collaborator clients: URL building, bounded
//! request execution and mapping of every failure onto [`ClientError`].

use anyhow::Context;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::error::{ClientError, ClientResult};
use crate::utils::normalize_base_url;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    service: &'static str,
    timeout_seconds: u64,
}

impl ServiceClient {
    /// `service` names the collaborator in errors and logs.
    pub fn new(service: &'static str, base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            service,
            timeout_seconds,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Send and return the status with the raw body of a 2xx response.
    pub async fn send(&self, request: RequestBuilder, path: &str) -> ClientResult<(StatusCode, String)> {
        let endpoint = self.url(path);
        debug!(service = self.service, %endpoint, "Calling collaborator");

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport(&endpoint, e))?;

        let status = response.status();
        trace!(service = self.service, %endpoint, %status, "Response status");

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport(&endpoint, e))?;

        if status.is_success() {
            Ok((status, body))
        } else {
            warn!(service = self.service, %endpoint, %status, "Collaborator returned error: {}", body);
            Err(self.upstream_failure(status, &body))
        }
    }

    pub async fn send_json<R>(&self, request: RequestBuilder, path: &str) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let (status, body) = self.send(request, path).await?;
        serde_json::from_str(&body).map_err(|e| {
            ClientError::upstream(
                Some(status.as_u16()),
                format!("Malformed response from {} ({}): {}", self.service, self.url(path), e),
            )
        })
    }

    /// Like [`send_json`](Self::send_json) but an empty body yields the default.
    pub async fn send_ack<R>(&self, request: RequestBuilder, path: &str) -> ClientResult<R>
    where
        R: DeserializeOwned + Default,
    {
        let (_, body) = self.send(request, path).await?;
        if body.trim().is_empty() {
            return Ok(R::default());
        }
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            debug!(service = self.service, "Ignoring unparseable acknowledgment body: {}", e);
            R::default()
        }))
    }

    fn map_transport(&self, endpoint: &str, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout {
                service: self.service,
                endpoint: endpoint.to_string(),
                seconds: self.timeout_seconds,
            }
        } else {
            ClientError::Transport {
                service: self.service,
                endpoint: endpoint.to_string(),
                reason: error.to_string(),
            }
        }
    }

    fn upstream_failure(&self, status: StatusCode, body: &str) -> ClientError {
        let message = extract_error_message(body)
            .or_else(|| plain_text_message(body))
            .unwrap_or_else(|| {
                format!("{} request failed (Status: {})", self.service, status.as_u16())
            });
        ClientError::upstream(Some(status.as_u16()), message)
    }
}

/// Join a fixed endpoint and caller-supplied segments into a request path.
/// Each segment is percent-encoded, `/`, `?` and `#` included.
pub fn segment_path(endpoint: &str, segments: &[&str]) -> ClientResult<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ClientError::validation(format!("Failed to build request path: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::validation("Failed to build request path"))?
        .clear()
        .extend(endpoint.split('/').filter(|part| !part.is_empty()))
        .extend(segments);
    Ok(url.path().to_string())
}

/// A bare text error body, as some services send with a 4xx. HTML pages
/// from proxies are not messages.
fn plain_text_message(body: &str) -> Option<String> {
    let text = body.trim();
    if text.is_empty() || text.starts_with('<') || text.starts_with('{') || text.starts_with('[') {
        return None;
    }
    Some(text.to_string())
}

/// Pull a human message out of a JSON error body: `{"error": "..."}`,
/// `{"error": {"message": "..."}}`, `{"message": "..."}` or `{"detail": "..."}`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    let candidates = [
        object.get("error").and_then(Value::as_str),
        object
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str),
        object.get("message").and_then(Value::as_str),
        object.get("detail").and_then(Value::as_str),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string);
    found
}
