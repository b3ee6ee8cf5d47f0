//! The network seam. [`ApiClient`](crate::http::ApiClient) builds
//! [`HttpRequest`]s and hands them to an [`HttpTransport`]; production code
//! uses [`ReqwestTransport`].

use std::{fmt, time::Duration};

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("planner/", env!("CARGO_PKG_VERSION"));

/// A request ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Header pairs in insertion order.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// A request with no headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First header with this name, compared case-insensitively.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of an answered request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Raw body text.
    pub body: String,
}

impl HttpResponse {
    /// A response with this status and body.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    /// Returns [`ClientError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            ClientError::decode(format!("{err} (HTTP {})", self.status.as_u16()))
        })
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Implementations report only transport failures as errors; every HTTP
/// status, including 4xx and 5xx, comes back as an [`HttpResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// Sends `request`.
    ///
    /// # Errors
    /// Only transport failures: no connection, timeouts, unreadable bodies.
    async fn execute(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

/// [`HttpTransport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with a per-request timeout.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                ClientError::timeout(err.to_string())
            } else {
                ClientError::transport(err.to_string())
            }
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                ClientError::timeout(err.to_string())
            } else {
                ClientError::transport(format!("failed to read response body: {err}"))
            }
        })?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::new(Method::GET, Url::parse("http://localhost/api").unwrap())
            .header("Authorization", "Basic abc");
        assert_eq!(request.header_value("authorization"), Some("Basic abc"));
        assert_eq!(request.header_value("accept"), None);
    }

    #[test]
    fn test_response_json_error_mentions_status() {
        let response = HttpResponse::new(StatusCode::OK, "<html>");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, ClientError::Decode(ref m) if m.contains("HTTP 200")));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let request = HttpRequest::new(
            Method::GET,
            Url::parse("http://127.0.0.1:9/api/trips/1").unwrap(),
        );
        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
