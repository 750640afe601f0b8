//! HTTP fetch capability used by the provider adapters.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Plain GET with optional headers. Transport errors and timeouts surface
/// as `CoreError::Upstream` with no status code.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// reqwest-backed fetcher with a bounded request timeout. The host
/// environment enforces an overall invocation deadline on top of this.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Self {
        // The timeout is load-bearing: nothing in the core may block
        // indefinitely, so a client without one is not an acceptable
        // fallback.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("MetalBot/1.0 (price widget)")
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::upstream("http", None, e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::upstream("http", Some(status), e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
