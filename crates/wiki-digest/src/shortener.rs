//! Link shortening for diff links.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DigestError, DigestResult};

/// Turns a long URL into the string placed after a page path.
#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, long_url: &str) -> DigestResult<String>;
}

/// Returns URLs unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughShortener;

#[async_trait]
impl LinkShortener for PassthroughShortener {
    async fn shorten(&self, long_url: &str) -> DigestResult<String> {
        Ok(long_url.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShortenRequest<'a> {
    long_url: &'a str,
}

#[derive(Deserialize)]
struct ShortenResponse {
    id: String,
}

/// Shortener API taking `{"longUrl": ...}` and answering `{"id": ...}`.
pub struct ApiShortener {
    api_url: String,
    client: reqwest::Client,
}

impl ApiShortener {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LinkShortener for ApiShortener {
    async fn shorten(&self, long_url: &str) -> DigestResult<String> {
        let response: ShortenResponse = self
            .client
            .post(&self.api_url)
            .json(&ShortenRequest { long_url })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(DigestError::Shortener)?
            .json()
            .await
            .map_err(DigestError::Shortener)?;

        debug!(long_url, short_url = %response.id, "Shortened link");
        Ok(response.id)
    }
}
