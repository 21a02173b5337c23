//! The HTTP layer underneath the [`Client`](crate::Client).
//!
//! Requests are handed to a [`Transport`] as plain method/URL/headers/body
//! values and come back as a status code and the raw body text. Anything
//! that goes wrong below HTTP (refused connections, DNS, timeouts) is a
//! [`TransportError`], never a status code.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Method, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};

/// Boxed source error of a [`TransportError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure below the HTTP layer: the request never produced a response
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct TransportError(BoxError);

impl TransportError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }
}

/// A request ready to be handed to a [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A `POST` carrying a JSON body.
    ///
    /// `Content-Type: application/json` always wins over a content type
    /// found in `headers`; every other header is kept.
    pub fn post(url: impl Into<String>, body: impl Into<String>, mut headers: HeaderMap) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method: Method::POST,
            url: url.into(),
            headers,
            body: Some(body.into()),
        }
    }
}

/// Status and raw body text of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues requests against the server.
///
/// A single transport is shared by every clone of a [`Client`](crate::Client)
/// and may be called from many tasks at once, so implementations must be
/// safe for concurrent use. Implementations must not retry.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a [`reqwest::Client`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-configured [`reqwest::Client`], e.g. one with custom TLS settings
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Fail any request that has not completed within `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::new)?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req = self.http_client.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }
        let resp = req.send().await.map_err(TransportError::new)?;
        let status = resp.status();
        let body = resp.text().await.map_err(TransportError::new)?;

        Ok(HttpResponse { status, body })
    }
}
