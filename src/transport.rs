//! HTTP transport
//!
//! The client never talks to the network directly; it goes through a
//! [`Transport`] so tests can substitute fixtures. [`HttpTransport`] is the
//! reqwest-backed implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::{Client, Url};
use thiserror::Error;

/// Errors raised below the HTTP status layer
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body read failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP error status: {0}")]
    Status(u16),

    /// Failure reported by a non-reqwest transport
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Status code and body of one upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to GET a URL
///
/// Implementations enforce their own timeouts and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError>;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport sending JSON `Accept`, the given `User-Agent`, an
    /// optional `userState` session cookie and the given request timeout
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        cookie: Option<&str>,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = cookie {
            let value = format!("userState={}", strip_cookie_prefix(cookie));
            let value = HeaderValue::from_str(&value)
                .map_err(|e| TransportError::Unavailable(format!("invalid cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

/// Accepts both `abc` and `userState=abc`
fn strip_cookie_prefix(cookie: &str) -> &str {
    cookie.strip_prefix("userState=").unwrap_or(cookie)
}
