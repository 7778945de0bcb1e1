//! Error types for digest runs.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from reading or writing the history ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger file could not be read.
    #[error("Failed to read ledger {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Ledger file could not be appended to.
    #[error("Failed to append to ledger {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors that abort a digest run.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Feed request failed or returned a non-2xx status.
    #[error("Failed to fetch feed for {wiki}: {source}")]
    FeedFetch {
        wiki: String,
        #[source]
        source: reqwest::Error,
    },

    /// Feed body is not RSS/Atom.
    #[error("Failed to parse feed for {wiki}: {message}")]
    FeedParse { wiki: String, message: String },

    /// Link shortener call failed.
    #[error("Link shortener request failed: {0}")]
    Shortener(#[source] reqwest::Error),

    /// A feed or diff URL could not be built.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Messaging transport failed.
    #[error(transparent)]
    Channel(#[from] notify::ChannelError),
}

/// Result alias for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;
