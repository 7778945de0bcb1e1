//! Grouping feed entries into per-page change sets.

use url::Url;

use crate::feed::FeedEntry;

/// All changes to one page within the reported range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChangeGroup {
    /// Path of the page, without query or fragment.
    pub page_path: String,
    /// Oldest version seen, the base of the diff link. `0` if none parse.
    pub min_version: i64,
    /// Entries ordered by version, ties in feed order.
    pub entries: Vec<FeedEntry>,
}

/// Path component of an entry link.
///
/// Links that are not absolute URLs are cut at the first `?` or `#`.
pub fn page_path(link: &str) -> String {
    match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Integer `version` query parameter of an entry link, `0` when absent or
/// not a number.
pub fn version(link: &str) -> i64 {
    let query = match Url::parse(link) {
        Ok(url) => url.query().map(str::to_string),
        Err(_) => link
            .split('#')
            .next()
            .and_then(|s| s.split_once('?'))
            .map(|(_, query)| query.to_string()),
    };

    query
        .as_deref()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, value)| key == "version" && !value.is_empty())
        })
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Partition entries by page.
///
/// Groups come out ordered by path. Sorting is stable throughout, so entries
/// with the same path and version keep their feed order.
pub fn group(entries: &[FeedEntry]) -> Vec<PageChangeGroup> {
    let mut keyed: Vec<(String, i64, &FeedEntry)> = entries
        .iter()
        .map(|entry| (page_path(&entry.link), version(&entry.link), entry))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    keyed
        .chunk_by(|a, b| a.0 == b.0)
        .map(|run| {
            let mut run = run.to_vec();
            run.sort_by_key(|(_, version, _)| *version);
            PageChangeGroup {
                page_path: run[0].0.clone(),
                min_version: run[0].1,
                entries: run.into_iter().map(|(_, _, entry)| entry.clone()).collect(),
            }
        })
        .collect()
}
