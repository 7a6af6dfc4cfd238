//! Minimal HTTP client abstraction for the oracle endpoints.
//!
//! The oracle only ever needs JSON POSTs, so this trait exposes exactly that.
//! Native builds can use [`ReqwestHttpClient`]; the browser uses
//! [`FetchHttpClient`](super::fetch::FetchHttpClient).

use futures::future::LocalBoxFuture;

/// A minimal async HTTP client for POST requests.
pub trait HttpClient {
    /// The error type for HTTP operations.
    type Error: std::error::Error + 'static;

    /// Send an HTTP POST request and return the response.
    fn post<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
        body: Vec<u8>,
    ) -> LocalBoxFuture<'a, Result<HttpResponse, Self::Error>>;
}

/// A minimal HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,

    /// The response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for the reqwest-based HTTP client.
#[cfg(feature = "reqwest")]
#[derive(Debug, thiserror::Error)]
#[error("HTTP request failed: {0}")]
pub struct ReqwestHttpError(#[from] reqwest::Error);

/// A [`reqwest`]-backed implementation of [`HttpClient`].
///
/// No timeout is configured; a hung oracle leaves the request pending.
#[cfg(feature = "reqwest")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "reqwest")]
impl HttpClient for ReqwestHttpClient {
    type Error = ReqwestHttpError;

    fn post<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
        body: Vec<u8>,
    ) -> LocalBoxFuture<'a, Result<HttpResponse, Self::Error>> {
        use futures::FutureExt;

        let mut builder = self.inner.post(url);
        for &(name, value) in headers {
            builder = builder.header(name, value);
        }
        builder = builder.body(body);

        async move {
            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let body = resp.bytes().await?.to_vec();
            Ok(HttpResponse { status, body })
        }
        .boxed_local()
    }
}
