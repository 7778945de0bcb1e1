//! Append-only ledger of reported date ranges.
//!
//! Each completed run appends one line:
//!
//! ```text
//! "Thu, 15 Oct 2026 09:00:02 +0000",2026-10-13,2026-10-14
//! ```
//!
//! The timestamp is quoted because RFC 2822 dates contain a comma. Only the
//! last line matters: its end date is where the next run resumes. A torn or
//! otherwise unparseable last line yields no record at all, so the next run
//! reports a single day instead of repeating ranges already posted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::dates::{DateRange, DATE_FORMAT};
use crate::error::LedgerError;

/// One reported range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// When the run finished. Informational only; `None` when the stored
    /// timestamp could not be read back.
    pub recorded_at: Option<DateTime<FixedOffset>>,
    pub range_begin: NaiveDate,
    pub range_end: NaiveDate,
}

impl HistoryRecord {
    /// Record a range as of now.
    #[must_use]
    pub fn now(range: DateRange) -> Self {
        Self {
            recorded_at: Some(Utc::now().fixed_offset()),
            range_begin: range.begin_date,
            range_end: range.last_date,
        }
    }

    /// Serialize to a ledger line, without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "\"{}\",{},{}",
            self.recorded_at
                .as_ref()
                .map(DateTime::to_rfc2822)
                .unwrap_or_default(),
            self.range_begin.format(DATE_FORMAT),
            self.range_end.format(DATE_FORMAT)
        )
    }

    /// Parse a ledger line. Returns a description of the problem on failure.
    ///
    /// Only the two dates are required; a timestamp that is not RFC 2822 is
    /// dropped rather than rejecting the line.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        // Split from the right: the timestamp itself contains a comma.
        let mut fields = line.trim_end_matches(['\r', '\n']).rsplitn(3, ',');
        let (Some(end), Some(begin), Some(timestamp)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(format!("expected 3 fields in {line:?}"));
        };

        let recorded_at = DateTime::parse_from_rfc2822(timestamp.trim().trim_matches('"')).ok();
        let range_begin = NaiveDate::parse_from_str(begin.trim(), DATE_FORMAT)
            .map_err(|e| format!("bad begin date {begin:?}: {e}"))?;
        let range_end = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT)
            .map_err(|e| format!("bad end date {end:?}: {e}"))?;

        Ok(Self {
            recorded_at,
            range_begin,
            range_end,
        })
    }
}

/// Storage of past run ranges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Record on the last line, or `None` when the ledger is empty or that
    /// line is malformed.
    async fn last_record(&self) -> Result<Option<HistoryRecord>, LedgerError>;

    /// Append a record and make sure it reached the disk.
    async fn append(&self, record: &HistoryRecord) -> Result<(), LedgerError>;
}

/// File-backed ledger.
pub struct HistoryLedger {
    path: PathBuf,
}

impl HistoryLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RunHistory for HistoryLedger {
    async fn last_record(&self) -> Result<Option<HistoryRecord>, LedgerError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Ledger does not exist yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        // Earlier lines never matter, malformed or not.
        let Some((index, line)) = contents
            .lines()
            .collect::<Vec<_>>()
            .into_iter()
            .enumerate()
            .rev()
            .find(|(_, line)| !line.trim().is_empty())
        else {
            return Ok(None);
        };

        match HistoryRecord::parse_line(line) {
            Ok(record) => Ok(Some(record)),
            Err(reason) => {
                warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    %reason,
                    "Last ledger line is malformed, ignoring history"
                );
                Ok(None)
            }
        }
    }

    async fn append(&self, record: &HistoryRecord) -> Result<(), LedgerError> {
        let write_err = |source| LedgerError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_err)?;

        let mut line = record.to_line();
        line.push('\n');
        file.write_all(line.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        debug!(
            path = %self.path.display(),
            begin = %record.range_begin,
            end = %record.range_end,
            "Appended ledger record"
        );
        Ok(())
    }
}
