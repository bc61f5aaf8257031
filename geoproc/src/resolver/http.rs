//! HTTP client abstraction for testability.

use std::future::Future;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default User-Agent string for outgoing requests.
const DEFAULT_USER_AGENT: &str = concat!("geoproc/", env!("CARGO_PKG_VERSION"));

/// Transport-level failures of the HTTP client.
#[derive(Debug, Error, Clone)]
pub enum HttpError {
    /// The URL could not be parsed.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    /// The request failed at the transport layer (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// A fetched response body plus what the transport declared about it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub bytes: Vec<u8>,
    /// `Content-Type` without parameters, lowercased.
    pub content_type: Option<String>,
    /// `charset` parameter of the `Content-Type`, if present.
    pub charset: Option<String>,
}

/// Asynchronous HTTP operations behind a trait, enabling mock clients in
/// tests and dependency injection in the resolver chain.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs a GET with the given headers.
    fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;

    /// Performs a POST with the given headers and body.
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

/// Real client implementation using reqwest.
///
/// Response decompression (gzip/deflate) is automatic and transparent.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    pub fn new(timeout: std::time::Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| HttpError::Transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn execute(&self, request: reqwest::RequestBuilder, url: &str) -> Result<HttpResponse, HttpError> {
        let response = match request.send().await {
            Ok(resp) => {
                debug!(url = url, status = resp.status().as_u16(), "HTTP response received");
                resp
            }
            Err(e) => {
                warn!(url = url, error = %e, is_timeout = e.is_timeout(), "HTTP request failed");
                return Err(HttpError::Transport(e.to_string()));
            }
        };

        if !response.status().is_success() {
            return Err(HttpError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let (content_type, charset) = parse_content_type(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(format!("failed to read response: {}", e)))?;
        trace!(url = url, bytes = bytes.len(), "HTTP response body read");

        Ok(HttpResponse {
            bytes: bytes.to_vec(),
            content_type,
            charset,
        })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, HttpError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| HttpError::MalformedUrl(url.to_string()))?;
        let mut request = self.client.get(parsed);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        self.execute(request, url).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Vec<u8>,
    ) -> Result<HttpResponse, HttpError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| HttpError::MalformedUrl(url.to_string()))?;
        let mut request = self.client.post(parsed).body(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        self.execute(request, url).await
    }
}

/// Splits a `Content-Type` header into (media type, charset).
fn parse_content_type(header: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(header) = header else {
        return (None, None);
    };

    let mut parts = header.split(';');
    let media_type = parts
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());
    let charset = parts
        .filter_map(|p| {
            let p = p.trim();
            p.to_ascii_lowercase()
                .strip_prefix("charset=")
                .map(|c| c.trim_matches('"').to_string())
        })
        .next();
    (media_type, charset)
}
