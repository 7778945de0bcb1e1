//! End-to-end runs of the digest against in-memory collaborators and a real
//! ledger file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use notify::{ChannelError, Delivery, MessageChannel, OutgoingMessage};
use tempfile::TempDir;
use wiki_digest::dates::parse_date;
use wiki_digest::{
    DateRange, DigestConfig, DigestError, DigestResult, DigestRunner, FeedEntry, FeedSource,
    HistoryLedger, HistoryRecord, LinkShortener, RunHistory, RunOutcome, RunRequest, WikiSource,
};

struct StaticFeeds {
    entries: HashMap<String, Vec<FeedEntry>>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticFeeds {
    fn new(entries: &[(&str, Vec<FeedEntry>)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, e)| ((*name).to_string(), e.clone()))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeeds {
    async fn fetch(&self, wiki: &WikiSource, _range: DateRange) -> DigestResult<Vec<FeedEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DigestError::FeedParse {
                wiki: wiki.name.clone(),
                message: "connection reset".to_string(),
            });
        }
        Ok(self.entries.get(&wiki.name).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct NumberingShortener {
    calls: AtomicUsize,
}

#[async_trait]
impl LinkShortener for NumberingShortener {
    async fn shorten(&self, _long_url: &str) -> DigestResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://s.example/{n}"))
    }
}

struct RecordingChannel {
    status: u16,
    posted: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingChannel {
    fn answering(status: u16) -> Self {
        Self {
            status,
            posted: Mutex::new(Vec::new()),
        }
    }

    fn posted(&self) -> Vec<OutgoingMessage> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn post(&self, message: &OutgoingMessage) -> Result<Delivery, ChannelError> {
        self.posted.lock().unwrap().push(message.clone());
        Ok(Delivery {
            status: self.status,
            body: String::new(),
        })
    }
}

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn wiki(name: &str, section: &str) -> WikiSource {
    WikiSource {
        name: name.to_string(),
        netloc: "trac.example.com".to_string(),
        base_path: format!("/{section}/wiki"),
        feed_url_base: format!("http://trac.example.com/{section}/timeline"),
    }
}

fn config(history_file_path: PathBuf) -> DigestConfig {
    DigestConfig {
        group_id: 777,
        access_token: "tok".to_string(),
        messages_url: "http://messages.invalid/".to_string(),
        history_file_path,
        wikis: vec![wiki("DevWiki", "dev"), wiki("OpsWiki", "ops")],
        shortener_api_url: None,
        logfile_path: None,
        client_id: None,
        client_secret: None,
        auth_url: None,
    }
}

fn dev_entries() -> Vec<FeedEntry> {
    vec![
        FeedEntry::new(
            "http://trac.example.com/dev/wiki/Foo?version=5",
            "<p>Reworded intro</p>",
        ),
        FeedEntry::new(
            "http://trac.example.com/dev/wiki/Bar?version=1",
            "<p>Created page</p>",
        ),
        FeedEntry::new(
            "http://trac.example.com/dev/wiki/Foo?version=3",
            "<p>Added setup steps</p>",
        ),
    ]
}

async fn seed_ledger(ledger: &HistoryLedger, begin: &str, end: &str) {
    ledger
        .append(&HistoryRecord {
            recorded_at: chrono::DateTime::parse_from_rfc2822("Sat, 06 Jan 2024 23:00:00 +0000")
                .ok(),
            range_begin: date(begin),
            range_end: date(end),
        })
        .await
        .unwrap();
}

fn request(today: &str) -> RunRequest {
    RunRequest {
        begin_override: None,
        last_override: None,
        today: date(today),
        dry_run: false,
    }
}

#[tokio::test]
async fn test_inverted_range_exits_one_and_leaves_ledger_alone() {
    let dir = TempDir::new().unwrap();
    let ledger_path = dir.path().join("history.csv");
    let ledger = HistoryLedger::new(&ledger_path);
    seed_ledger(&ledger, "2024-01-01", "2024-01-05").await;
    let before = std::fs::read_to_string(&ledger_path).unwrap();

    let config = config(ledger_path.clone());
    let feeds = StaticFeeds::new(&[("DevWiki", dev_entries())]);
    let shortener = NumberingShortener::default();
    let channel = RecordingChannel::answering(201);
    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: &shortener,
        channel: &channel,
        history: &ledger,
    };

    let outcome = runner
        .run(RunRequest {
            begin_override: Some(date("2024-01-10")),
            last_override: Some(date("2024-01-09")),
            ..request("2024-01-20")
        })
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::NothingToReport { .. }));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(std::fs::read_to_string(&ledger_path).unwrap(), before);
    assert_eq!(feeds.calls.load(Ordering::SeqCst), 0);
    assert!(channel.posted().is_empty());
}

#[tokio::test]
async fn test_normal_run_posts_digest_and_records_range() {
    let dir = TempDir::new().unwrap();
    let ledger = HistoryLedger::new(dir.path().join("history.csv"));
    seed_ledger(&ledger, "2024-01-01", "2024-01-06").await;

    let config = config(ledger.path().to_path_buf());
    let feeds = StaticFeeds::new(&[("DevWiki", dev_entries())]);
    let shortener = NumberingShortener::default();
    let channel = RecordingChannel::answering(201);
    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: &shortener,
        channel: &channel,
        history: &ledger,
    };

    let outcome = runner.run(request("2024-01-10")).await.unwrap();

    let range = DateRange::new(date("2024-01-07"), date("2024-01-09"));
    assert_eq!(outcome, RunOutcome::Delivered { range });
    assert_eq!(outcome.exit_code(), 0);

    let posted = channel.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].group_id, 777);
    assert_eq!(
        posted[0].body,
        "\
7日から9日のDevWikiの更新は以下の通りです:
Bar<https://s.example/1>
... Created page
Foo<https://s.example/2>
... Added setup steps
... Reworded intro

7日から9日はOpsWikiの更新はありませんでした。
"
    );

    let last = ledger.last_record().await.unwrap().unwrap();
    assert_eq!(last.range_begin, range.begin_date);
    assert_eq!(last.range_end, range.last_date);
}

#[tokio::test]
async fn test_rerun_same_day_has_nothing_to_report() {
    let dir = TempDir::new().unwrap();
    let ledger = HistoryLedger::new(dir.path().join("history.csv"));

    let config = config(ledger.path().to_path_buf());
    let feeds = StaticFeeds::new(&[]);
    let shortener = NumberingShortener::default();
    let channel = RecordingChannel::answering(201);
    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: &shortener,
        channel: &channel,
        history: &ledger,
    };

    let first = runner.run(request("2024-01-10")).await.unwrap();
    assert_eq!(
        first,
        RunOutcome::Delivered {
            range: DateRange::new(date("2024-01-09"), date("2024-01-09"))
        }
    );

    let second = runner.run(request("2024-01-10")).await.unwrap();
    assert!(matches!(second, RunOutcome::NothingToReport { .. }));
    assert_eq!(channel.posted().len(), 1);

    let lines = std::fs::read_to_string(ledger.path()).unwrap();
    assert_eq!(lines.lines().count(), 1);
}

#[tokio::test]
async fn test_dry_run_renders_long_links_and_still_records() {
    let dir = TempDir::new().unwrap();
    let ledger = HistoryLedger::new(dir.path().join("history.csv"));

    let config = config(ledger.path().to_path_buf());
    let feeds = StaticFeeds::new(&[("DevWiki", dev_entries())]);
    let shortener = NumberingShortener::default();
    let channel = RecordingChannel::answering(201);
    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: &shortener,
        channel: &channel,
        history: &ledger,
    };

    let outcome = runner
        .run(RunRequest {
            dry_run: true,
            ..request("2024-01-10")
        })
        .await
        .unwrap();

    let RunOutcome::DryRun { range, digest } = &outcome else {
        panic!("expected dry run, got {outcome:?}");
    };
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(*range, DateRange::new(date("2024-01-09"), date("2024-01-09")));
    assert!(digest.starts_with("9日のDevWikiの更新は以下の通りです:\n"));
    assert!(digest.contains("Foo<http://trac.example.com/dev/wiki/Foo?action=diff&old_version=3>"));

    assert_eq!(shortener.calls.load(Ordering::SeqCst), 0);
    assert!(channel.posted().is_empty());

    let last = ledger.last_record().await.unwrap().unwrap();
    assert_eq!(last.range_end, date("2024-01-09"));
}

#[tokio::test]
async fn test_rejected_post_exits_one_but_records_range() {
    let dir = TempDir::new().unwrap();
    let ledger = HistoryLedger::new(dir.path().join("history.csv"));

    let config = config(ledger.path().to_path_buf());
    let feeds = StaticFeeds::new(&[]);
    let shortener = NumberingShortener::default();
    let channel = RecordingChannel::answering(500);
    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: &shortener,
        channel: &channel,
        history: &ledger,
    };

    let outcome = runner.run(request("2024-01-10")).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Rejected { status: 500, .. }));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(channel.posted().len(), 1);
    assert!(ledger.last_record().await.unwrap().is_some());
}

#[tokio::test]
async fn test_feed_failure_aborts_without_recording() {
    let dir = TempDir::new().unwrap();
    let ledger = HistoryLedger::new(dir.path().join("history.csv"));

    let config = config(ledger.path().to_path_buf());
    let feeds = StaticFeeds::failing();
    let shortener = NumberingShortener::default();
    let channel = RecordingChannel::answering(201);
    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: &shortener,
        channel: &channel,
        history: &ledger,
    };

    let err = runner.run(request("2024-01-10")).await.unwrap_err();

    assert!(matches!(err, DigestError::FeedParse { .. }));
    assert!(channel.posted().is_empty());
    assert!(!ledger.path().exists());
}
