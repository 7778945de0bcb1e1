//! Reporting date range resolution.

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::ledger::RunHistory;

/// Date format used on the command line and in the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar range of days to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub begin_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(begin_date: NaiveDate, last_date: NaiveDate) -> Self {
        Self {
            begin_date,
            last_date,
        }
    }

    /// An inverted range means everything up to `last_date` was already
    /// reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin_date > self.last_date
    }

    /// Number of days before `last_date` the range reaches back.
    #[must_use]
    pub fn days_back(&self) -> i64 {
        (self.last_date - self.begin_date).num_days()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

/// Work out which days this run reports.
///
/// `last_date` defaults to the day before `today`. `begin_date` defaults to the
/// day after the last recorded range, or to `last_date` when the ledger is
/// empty, unreadable or ends in a malformed record. The ledger is only
/// consulted without a begin override.
pub async fn resolve(
    begin_override: Option<NaiveDate>,
    last_override: Option<NaiveDate>,
    today: NaiveDate,
    history: &dyn RunHistory,
) -> DateRange {
    let last_date = last_override.unwrap_or_else(|| previous_day(today));

    let begin_date = match begin_override {
        Some(date) => date,
        None => match history.last_record().await {
            Ok(Some(record)) => {
                debug!(previous_end = %record.range_end, "Resuming after last recorded range");
                next_day(record.range_end)
            }
            Ok(None) => {
                warn!("No usable previous range recorded, reporting a single day");
                last_date
            }
            Err(e) => {
                warn!(error = %e, "Could not read ledger, reporting a single day");
                last_date
            }
        },
    };

    DateRange::new(begin_date, last_date)
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}
