//! The seam between query builders and the network.

use std::time::Duration;

use async_trait::async_trait;
use ogc_common::{DiscoveryError, DiscoveryResult};
use ogc_protocol::{HttpMethod, Query};
use reqwest::{header::CONTENT_TYPE, Client, Method};
use tracing::{debug, instrument};

use crate::config::{BasicAuth, DiscoveryConfig};

/// Status, content type and text body of a completed round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into a transport error.
    pub fn error_for_status(self) -> DiscoveryResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(DiscoveryError::http_status(self.status))
        }
    }
}

/// Executes one [`Query`].
///
/// Implementations must stop promptly with [`DiscoveryError::Cancelled`] once
/// the query's token is cancelled, and must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, query: &Query) -> DiscoveryResult<HttpResponse>;
}

/// HTTP transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    auth: Option<BasicAuth>,
}

impl ReqwestTransport {
    pub fn new(config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        let mut builder = Client::builder().tcp_nodelay(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DiscoveryError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }

    async fn send(&self, query: &Query) -> DiscoveryResult<HttpResponse> {
        let method = match query.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut request = self.client.request(method, query.url.clone());
        for (name, value) in &query.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &query.body {
            request = request.body(body.clone());
        }
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| DiscoveryError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| DiscoveryError::Transport {
            status: Some(status),
            message: format!("failed to read body: {e}"),
        })?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, query), fields(method = %query.method, url = %query.url))]
    async fn execute(&self, query: &Query) -> DiscoveryResult<HttpResponse> {
        tokio::select! {
            biased;
            _ = query.cancel.cancelled() => {
                debug!("Request cancelled");
                Err(DiscoveryError::Cancelled)
            }
            result = self.send(query) => result,
        }
    }
}
