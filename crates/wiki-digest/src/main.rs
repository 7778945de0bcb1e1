//! CLI for posting wiki change digests
//!
//! Run `wiki-digest --help` for usage information.

// CLI binaries legitimately need println! for user output
#![allow(clippy::disallowed_macros)]

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use notify::{MessageChannel, OAuthClient, YammerChannel};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wiki_digest::{
    dates, ApiShortener, DigestConfig, DigestRunner, HistoryLedger, HttpFeedSource,
    LinkShortener, PassthroughShortener, RunOutcome, RunRequest,
};

#[derive(Parser)]
#[command(name = "wiki-digest")]
#[command(about = "Post a digest of wiki changes to a messaging group")]
#[command(version)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "wiki-digest.yaml")]
    config_file: PathBuf,

    /// Print the digest instead of posting it (the range is still recorded)
    #[arg(long)]
    dry_run: bool,

    /// First day to report, YYYY-MM-DD (default: day after the last recorded range)
    #[arg(long, value_parser = parse_date_arg)]
    begin_date: Option<NaiveDate>,

    /// Last day to report, YYYY-MM-DD (default: yesterday)
    #[arg(long, value_parser = parse_date_arg)]
    last_date: Option<NaiveDate>,

    /// Exchange an OAuth authorization code for an access token and exit
    #[arg(long, requires = "auth_code")]
    fetch_token: bool,

    /// Authorization code obtained from the OAuth authorize page
    #[arg(long)]
    auth_code: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    dates::parse_date(s).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = DigestConfig::load(&cli.config_file)
        .with_context(|| format!("Failed to load {}", cli.config_file.display()))?;

    init_logging(config.logfile_path.as_deref(), cli.verbose)?;

    if cli.fetch_token {
        let code = cli.auth_code.as_deref().unwrap_or_default();
        run_fetch_token(&config, code).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let feeds = HttpFeedSource::new();
    let shortener: Box<dyn LinkShortener> = match &config.shortener_api_url {
        Some(url) => Box::new(ApiShortener::new(url)),
        None => Box::new(PassthroughShortener),
    };
    let channel = YammerChannel::new(&config.messages_url, &config.access_token);
    if !cli.dry_run && !channel.enabled() {
        anyhow::bail!("access_token is required to post the digest; see --fetch-token");
    }
    let ledger = HistoryLedger::new(&config.history_file_path);

    let runner = DigestRunner {
        config: &config,
        feeds: &feeds,
        shortener: shortener.as_ref(),
        channel: &channel,
        history: &ledger,
    };

    let outcome = runner
        .run(RunRequest {
            begin_override: cli.begin_date,
            last_override: cli.last_date,
            today: chrono::Local::now().date_naive(),
            dry_run: cli.dry_run,
        })
        .await?;

    if let RunOutcome::DryRun { digest, .. } = &outcome {
        println!("{digest}");
    }

    let code = outcome.exit_code();
    info!(exit_code = code, "Run finished");
    Ok(if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_fetch_token(config: &DigestConfig, code: &str) -> Result<()> {
    let client_id = config
        .client_id
        .as_deref()
        .context("client_id is required to fetch a token")?;
    let client_secret = config
        .client_secret
        .as_deref()
        .context("client_secret is required to fetch a token")?;
    let token_url = config
        .auth_url
        .as_deref()
        .unwrap_or(notify::auth::DEFAULT_TOKEN_URL);

    let token = OAuthClient::new(token_url, client_id, client_secret)
        .exchange_code(code)
        .await?;

    println!("{token}");
    Ok(())
}

fn init_logging(logfile: Option<&Path>, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    match logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .init();
        }
        None => {
            registry
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
