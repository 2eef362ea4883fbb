//! HTTP transport shared by all statement operations.
//!
//! A single pooled [`reqwest::Client`] serves every request; callers receive
//! the raw status, `content-encoding` and body bytes and run them through
//! [`decode_response`](crate::transport::decode_response) themselves. The
//! transport never decompresses: `Accept-Encoding` is set manually and the
//! decode pipeline owns the gzip handling.

use crate::error::TransportError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING};
use serde::Serialize;
use std::time::Duration;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("snowrest-rs/", env!("CARGO_PKG_VERSION"));

/// Vendor header declaring how the bearer token should be interpreted.
const AUTH_TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";
const AUTH_TOKEN_TYPE: &str = "KEYPAIR_JWT";

/// Per-request timeout. The overall execution timeout is enforced by the
/// poll loop, not here.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A raw response before decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// `content-encoding` header value, if present
    pub content_encoding: Option<String>,
    /// Body bytes exactly as received
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pooled HTTP client bound to one API base URL.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given base URL.
    ///
    /// # Errors
    /// [`TransportError::InvalidUrl`] when the base URL does not parse,
    /// [`TransportError::Http`] when the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            AUTH_TOKEN_TYPE_HEADER,
            HeaderValue::from_static(AUTH_TOKEN_TYPE),
        );

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST a JSON body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path_and_query: &str,
        token: &str,
        body: &B,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(self.url(path_and_query))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::collect(response).await
    }

    /// POST with no body.
    pub async fn post_empty(
        &self,
        path_and_query: &str,
        token: &str,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .post(self.url(path_and_query))
            .bearer_auth(token)
            .send()
            .await?;
        Self::collect(response).await
    }

    /// GET a resource.
    pub async fn get(
        &self,
        path_and_query: &str,
        token: &str,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(self.url(path_and_query))
            .bearer_auth(token)
            .send()
            .await?;
        Self::collect(response).await
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    async fn collect(response: reqwest::Response) -> Result<RawResponse, TransportError> {
        let status = response.status().as_u16();
        let content_encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_encoding,
            body,
        })
    }
}
