use crate::error::FetchError;
use crate::playlist::RangeUrl;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::RANGE, Client};
use std::time::Instant;
use tracing::debug;

/// The transport primitive the player drives: one GET, optionally restricted to a byte range.
#[async_trait]
pub trait SegmentFetcher: Send + Sync {
    /// Downloads `request`. Succeeds only on a 2xx status with a non-empty body.
    async fn fetch(&self, request: &RangeUrl) -> Result<Bytes, FetchError>;
}

/// [`SegmentFetcher`] over a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SegmentFetcher for HttpFetcher {
    async fn fetch(&self, request: &RangeUrl) -> Result<Bytes, FetchError> {
        let url = request.url.as_str();
        let mut builder = self.client.get(request.url.clone());
        if let Some(range) = &request.byte_range {
            builder = builder.header(RANGE, format!("bytes={range}"));
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| FetchError::transport(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| FetchError::transport(url, e))?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody { url: url.to_string() });
        }

        debug!("Fetched {} ({} bytes) in {:.3}s", request, body.len(), start.elapsed().as_secs_f64());
        Ok(body)
    }
}
