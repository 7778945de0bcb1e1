//! Wiki timeline feeds.

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::config::WikiSource;
use crate::dates::DateRange;
use crate::error::{DigestError, DigestResult};

/// One item of a change feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Page URL including a `version` query parameter.
    pub link: String,
    /// Change description markup, possibly empty.
    pub description: String,
}

impl FeedEntry {
    pub fn new(link: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            description: description.into(),
        }
    }
}

/// Source of feed entries for a wiki and range.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Entries in feed order.
    async fn fetch(&self, wiki: &WikiSource, range: DateRange) -> DigestResult<Vec<FeedEntry>>;
}

/// Build the timeline feed URL covering `range`.
///
/// The timeline endpoint counts `daysback` backwards from `from`, so `from` is
/// the last day of the range.
pub fn feed_url(wiki: &WikiSource, range: DateRange) -> DigestResult<Url> {
    let mut url = Url::parse(&wiki.feed_url_base).map_err(|source| DigestError::InvalidUrl {
        url: wiki.feed_url_base.clone(),
        source,
    })?;
    url.query_pairs_mut()
        .append_pair("from", &range.last_date.format("%Y/%m/%d").to_string())
        .append_pair("daysback", &range.days_back().to_string())
        .append_pair("wiki", "on")
        .append_pair("format", "rss");
    Ok(url)
}

/// Fetches and parses feeds over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, wiki: &WikiSource, range: DateRange) -> DigestResult<Vec<FeedEntry>> {
        let url = feed_url(wiki, range)?;
        debug!(wiki = %wiki.name, url = %url, "Fetching feed");

        let fetch_err = |source| DigestError::FeedFetch {
            wiki: wiki.name.clone(),
            source,
        };
        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_err)?
            .bytes()
            .await
            .map_err(fetch_err)?;

        let entries = parse_feed(&wiki.name, &body)?;
        info!(wiki = %wiki.name, entries = entries.len(), "Fetched feed");
        Ok(entries)
    }
}

/// Extract link and description from each item of an RSS or Atom document.
pub fn parse_feed(wiki_name: &str, body: &[u8]) -> DigestResult<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(body).map_err(|e| DigestError::FeedParse {
        wiki: wiki_name.to_string(),
        message: e.to_string(),
    })?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .into_iter()
                .next()
                .map(|link| link.href)
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|text| text.content)
                .or_else(|| entry.content.and_then(|content| content.body))
                .unwrap_or_default();
            FeedEntry { link, description }
        })
        .collect())
}
