//! Digest text rendering.
//!
//! Output for a range with changes looks like:
//!
//! ```text
//! 7日から9日のDevWikiの更新は以下の通りです:
//! Guide/Install<https://short.example/abc>
//! ... Fixed a typo
//!
//! 7日から9日はOpsWikiの更新はありませんでした。
//! ```
//!
//! Detail blocks end with a blank line; a "no update" line does not.

use std::fmt::Write as _;

use chrono::Datelike;
use url::Url;

use crate::config::WikiSource;
use crate::dates::DateRange;
use crate::error::{DigestError, DigestResult};
use crate::extract::paragraph_text;
use crate::grouping::PageChangeGroup;
use crate::shortener::LinkShortener;

/// Grouped changes of one wiki.
#[derive(Debug, Clone)]
pub struct SourceChanges<'a> {
    pub wiki: &'a WikiSource,
    pub groups: Vec<PageChangeGroup>,
}

/// Day-of-month phrase for the header.
pub fn day_phrase(range: DateRange) -> String {
    if range.begin_date < range.last_date {
        format!(
            "{}日から{}日",
            range.begin_date.day(),
            range.last_date.day()
        )
    } else {
        format!("{}日", range.last_date.day())
    }
}

/// Link to the diff from the group's oldest version to the current page.
pub fn diff_url(wiki: &WikiSource, group: &PageChangeGroup) -> DigestResult<Url> {
    let base = format!("http://{}", wiki.netloc);
    let mut url = Url::parse(&base).map_err(|source| DigestError::InvalidUrl {
        url: base.clone(),
        source,
    })?;
    url.set_path(&group.page_path);
    url.query_pairs_mut()
        .append_pair("action", "diff")
        .append_pair("old_version", &group.min_version.to_string());
    Ok(url)
}

/// `path` relative to `base`, like POSIX `relpath`.
pub fn relative_path(path: &str, base: &str) -> String {
    let path = normalize(path);
    let base = normalize(base);

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<&str> = std::iter::repeat("..")
        .take(base.len() - common)
        .chain(path[common..].iter().copied())
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn normalize(path: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts
}

/// Render the digest for all wikis, in the order given.
pub async fn render(
    range: DateRange,
    sources: &[SourceChanges<'_>],
    shortener: &dyn LinkShortener,
) -> DigestResult<String> {
    let days = day_phrase(range);
    let mut out = String::new();

    for source in sources {
        let name = &source.wiki.name;

        if source.groups.is_empty() {
            let _ = writeln!(out, "{days}は{name}の更新はありませんでした。");
            continue;
        }

        let _ = writeln!(out, "{days}の{name}の更新は以下の通りです:");

        for group in &source.groups {
            let link = shortener
                .shorten(diff_url(source.wiki, group)?.as_str())
                .await?;
            let rel_path = relative_path(&group.page_path, &source.wiki.base_path);
            let _ = writeln!(out, "{rel_path}<{link}>");

            for text in group
                .entries
                .iter()
                .filter_map(|entry| paragraph_text(&entry.description))
            {
                let _ = writeln!(out, "... {text}");
            }
        }
        out.push('\n');
    }

    Ok(out)
}
