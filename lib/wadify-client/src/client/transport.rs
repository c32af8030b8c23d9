use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reqwest::{Body, Request};
use tracing::debug;
use url::Url;

use super::error::ApiError;

/// A single HTTP request at the transport boundary.
///
/// The pipeline assembles one of these (method, resolved URL, merged headers,
/// serialized body) and hands it to a [`Transport`] for dispatch.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved request URL.
    pub url: Url,
    /// Request headers, already merged.
    pub headers: HeaderMap,
    /// Serialized request body, when present.
    pub body: Option<Bytes>,
}

impl TransportRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// The response counterpart of [`TransportRequest`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Returns the body as text for diagnostics, lossy on invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Capability required from the underlying HTTP transport.
///
/// Every received HTTP response comes back as `Ok`, whatever its status code;
/// only socket-level failures (connection, TLS, timeout) are `Err`, mapped to
/// [`ApiError::Transport`]. Connection reuse, TLS, and low-level retries are
/// the implementation's responsibility.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Dispatches the request and collects the full response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError>;
}

/// Production [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport from a pre-configured `reqwest` client, for
    /// callers that need custom pooling, proxy, or timeout settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req = Request::new(method.clone(), url.clone());
        *req.headers_mut() = headers;
        if let Some(bytes) = body {
            *req.body_mut() = Some(Body::from(bytes));
        }

        debug!(%method, %url, "sending...");
        let response = self
            .client
            .execute(req)
            .await
            .map_err(|err| ApiError::transport(method.clone(), url.to_string(), err.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::transport(method.clone(), url.to_string(), err.to_string()))?;
        debug!(%method, %url, %status, "...receiving");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
