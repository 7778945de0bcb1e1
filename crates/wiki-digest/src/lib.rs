#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

//! # Wiki Digest
//!
//! Summarizes wiki changes from timeline feeds and posts the summary to a
//! messaging group, remembering which days were already reported.
//!
//! A run goes through:
//! - [`dates::resolve`] picks the days to report from overrides and the ledger
//! - [`feed::FeedSource`] fetches each wiki's timeline
//! - [`grouping::group`] collapses entries into one group per page
//! - [`render::render`] produces the digest text
//! - [`runner::DigestRunner`] posts it and appends the range to the ledger
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = DigestConfig::load("wiki-digest.yaml")?;
//! let ledger = HistoryLedger::new(&config.history_file_path);
//! let runner = DigestRunner {
//!     config: &config,
//!     feeds: &HttpFeedSource::new(),
//!     shortener: &PassthroughShortener,
//!     channel: &YammerChannel::new(&config.messages_url, &config.access_token),
//!     history: &ledger,
//! };
//! let outcome = runner.run(request).await?;
//! std::process::exit(outcome.exit_code());
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod feed;
pub mod grouping;
pub mod ledger;
pub mod render;
pub mod runner;
pub mod shortener;

pub use config::{ConfigError, DigestConfig, WikiSource};
pub use dates::DateRange;
pub use error::{DigestError, DigestResult, LedgerError};
pub use feed::{FeedEntry, FeedSource, HttpFeedSource};
pub use grouping::PageChangeGroup;
pub use ledger::{HistoryLedger, HistoryRecord, RunHistory};
pub use runner::{DigestRunner, RunOutcome, RunRequest};
pub use shortener::{ApiShortener, LinkShortener, PassthroughShortener};
