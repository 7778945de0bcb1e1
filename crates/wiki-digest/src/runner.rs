//! Digest run orchestration.

use chrono::NaiveDate;
use notify::{MessageChannel, OutgoingMessage};
use tracing::{error, info};

use crate::config::DigestConfig;
use crate::dates::{self, DateRange};
use crate::error::DigestResult;
use crate::feed::FeedSource;
use crate::grouping;
use crate::ledger::{HistoryRecord, RunHistory};
use crate::render::{self, SourceChanges};
use crate::shortener::{LinkShortener, PassthroughShortener};

/// Inputs of a single run.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest {
    pub begin_override: Option<NaiveDate>,
    pub last_override: Option<NaiveDate>,
    /// Current calendar date; the default range ends the day before.
    pub today: NaiveDate,
    /// Render without minting short links or posting.
    pub dry_run: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Range already reported; nothing fetched, nothing recorded.
    NothingToReport { range: DateRange },
    /// Digest rendered but not posted.
    DryRun { range: DateRange, digest: String },
    /// Digest posted and accepted.
    Delivered { range: DateRange },
    /// Messaging service answered with a non-2xx status.
    Rejected { range: DateRange, status: u16 },
}

impl RunOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DryRun { .. } | Self::Delivered { .. } => 0,
            Self::NothingToReport { .. } | Self::Rejected { .. } => 1,
        }
    }
}

/// Collaborators of a run.
pub struct DigestRunner<'a> {
    pub config: &'a DigestConfig,
    pub feeds: &'a dyn FeedSource,
    pub shortener: &'a dyn LinkShortener,
    pub channel: &'a dyn MessageChannel,
    pub history: &'a dyn RunHistory,
}

impl DigestRunner<'_> {
    /// Resolve the range, build and deliver the digest, record the range.
    ///
    /// The range is recorded for dry runs and rejected posts too; only an
    /// empty range skips the ledger. Errors abort before anything is recorded.
    pub async fn run(&self, request: RunRequest) -> DigestResult<RunOutcome> {
        let range = dates::resolve(
            request.begin_override,
            request.last_override,
            request.today,
            self.history,
        )
        .await;

        if range.is_empty() {
            info!(
                begin_date = %range.begin_date,
                last_date = %range.last_date,
                "Begin date is later than last date, nothing to report"
            );
            return Ok(RunOutcome::NothingToReport { range });
        }

        info!(
            begin_date = %range.begin_date,
            last_date = %range.last_date,
            dry_run = request.dry_run,
            "Building digest"
        );

        let shortener: &dyn LinkShortener = if request.dry_run {
            &PassthroughShortener
        } else {
            self.shortener
        };
        let digest = self.build_digest(range, shortener).await?;

        let outcome = if request.dry_run {
            info!("Dry run, not posting digest");
            RunOutcome::DryRun { range, digest }
        } else {
            let message = OutgoingMessage::new(digest, self.config.group_id);
            let delivery = self.channel.post(&message).await?;
            if delivery.is_success() {
                info!(channel = self.channel.name(), status = delivery.status, "Digest posted");
                RunOutcome::Delivered { range }
            } else {
                error!(
                    channel = self.channel.name(),
                    status = delivery.status,
                    body = %delivery.body,
                    "Digest was not accepted"
                );
                RunOutcome::Rejected {
                    range,
                    status: delivery.status,
                }
            }
        };

        self.history.append(&HistoryRecord::now(range)).await?;
        Ok(outcome)
    }

    async fn build_digest(
        &self,
        range: DateRange,
        shortener: &dyn LinkShortener,
    ) -> DigestResult<String> {
        let mut sources = Vec::with_capacity(self.config.wikis.len());
        for wiki in &self.config.wikis {
            let entries = self.feeds.fetch(wiki, range).await?;
            sources.push(SourceChanges {
                wiki,
                groups: grouping::group(&entries),
            });
        }
        render::render(range, &sources, shortener).await
    }
}
