//! Transports that carry one attempt to the backend.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, redirect};
use tracing::trace;

use crate::{ClientConfig, RpcRequest, TransportError};

/// Status and body of one HTTP exchange, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Delivers a request and returns whatever the server answered.
///
/// Implementations perform exactly one attempt. Retrying is the client's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RpcRequest) -> Result<RawResponse, TransportError>;
}

/// HTTPS transport posting JSON to a single fixed endpoint.
///
/// No cookie store and no authorization header are attached, and redirects
/// are followed (the backend answers through a redirect).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RpcRequest) -> Result<RawResponse, TransportError> {
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        trace!(action = request.action(), %status, len = body.len(), "received response");

        Ok(RawResponse { status, body })
    }
}
