//! Plain-text extraction from change descriptions.

use scraper::{Html, Selector};

/// Text of all `<p>` elements in `markup`, whitespace collapsed and
/// paragraphs joined by a space. `None` when there is no such text.
pub fn paragraph_text(markup: &str) -> Option<String> {
    if markup.trim().is_empty() {
        return None;
    }

    let fragment = Html::parse_fragment(markup);
    let selector = Selector::parse("p").ok()?;

    let text = fragment
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .flat_map(|s| {
            s.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join(" ");

    (!text.is_empty()).then_some(text)
}
