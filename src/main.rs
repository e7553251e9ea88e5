//! Web Status Checker main entry point
//!
//! This is the command-line interface for the link health checker.

use anyhow::Context;
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use web_status_checker::config::{load_config_with_hash, validate, Config};
use web_status_checker::crawler::run_crawl_with_config;
use web_status_checker::output::{print_statistics, write_reports, CrawlSummary, ReportMeta};
use web_status_checker::{CrawlRun, LinkRecord};

/// Exit code when broken or errored links were found with `--fail-on-broken`
const EXIT_BROKEN_LINKS: u8 = 1;

/// Exit code when the start page could not be read
const EXIT_START_PAGE_UNREADABLE: u8 = 2;

/// Web Status Checker: a link health checker
///
/// Fetches a start page, checks every link it contains (anchors, sitemap
/// entries and form actions) and optionally follows working links to a
/// bounded depth. Results are written as HTML, JSON and CSV reports.
#[derive(Parser, Debug)]
#[command(name = "web-status-checker")]
#[command(version = "1.0.0")]
#[command(about = "A link health checker", long_about = None)]
struct Cli {
    /// Starting URL (must include http/https)
    #[arg(long, value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Follow links that validated successfully
    #[arg(long)]
    follow: bool,

    /// Maximum depth for following links (start page is depth 0)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of links checked at the same time
    #[arg(long)]
    concurrency: Option<u32>,

    /// Additional attempts for a link after a transport error
    #[arg(long)]
    retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Directory reports are written to
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Exit with code 1 if any broken or error links are found
    #[arg(long)]
    fail_on_broken: bool,

    /// Also write warnings and errors to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref());

    let (config, config_hash) =
        load_effective_config(&cli).context("Failed to load configuration")?;

    let run = CrawlRun::from_config(&cli.url, &config.crawler)
        .with_context(|| format!("Invalid start URL: {}", cli.url))?;

    // Ctrl-C stops new checks and returns what was gathered so far
    let cancel = run.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling remaining checks");
            cancel.cancel();
        }
    });

    let start_url = run.start_url.to_string();
    let records = match run_crawl_with_config(run, &config).await {
        Ok(records) => records,
        Err(failure) => {
            tracing::error!("{}", failure);
            eprintln!("No links checked: {}", failure);
            return Ok(ExitCode::from(EXIT_START_PAGE_UNREADABLE));
        }
    };

    if records.is_empty() {
        println!("No links found on {}", start_url);
    }

    let meta = ReportMeta::new(&start_url, config_hash);
    let written = save_reports(&config, &records, &meta).with_context(|| {
        format!("Failed to write reports to {}", config.output.report_dir)
    })?;

    let summary = CrawlSummary::from_records(&records);
    if !cli.quiet {
        println!();
        print_statistics(&summary);
        println!();
        for path in &written {
            println!("Report saved to: {}", display_path(path));
        }
    }

    if cli.fail_on_broken && summary.has_failures() {
        eprintln!(
            "{} broken/error links found. Exiting with error code {}.",
            summary.broken + summary.errored,
            EXIT_BROKEN_LINKS
        );
        return Ok(ExitCode::from(EXIT_BROKEN_LINKS));
    }

    Ok(ExitCode::SUCCESS)
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> web_status_checker::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if cli.follow {
        config.crawler.follow_internal = true;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_checks = concurrency;
    }
    if let Some(retries) = cli.retries {
        config.crawler.retries = retries;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(report_dir) = &cli.report_dir {
        config.output.report_dir = report_dir.display().to_string();
    }

    validate(&config)?;
    Ok((config, hash))
}

/// Writes every configured report format into the report directory
fn save_reports(
    config: &Config,
    records: &[LinkRecord],
    meta: &ReportMeta,
) -> web_status_checker::Result<Vec<PathBuf>> {
    let report_dir = PathBuf::from(&config.output.report_dir);
    Ok(write_reports(&report_dir, &config.output.formats, records, meta)?)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// With a log file, WARN and above are mirrored into it. A log file that
/// cannot be opened is reported on stderr and skipped.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_status_checker=info,warn"),
            1 => EnvFilter::new("web_status_checker=debug,info"),
            2 => EnvFilter::new("web_status_checker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(filter);

    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::WARN),
        ),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn display_path(path: &Path) -> String {
    match path.canonicalize() {
        Ok(full) => format!("file://{}", full.display()),
        Err(_) => path.display().to_string(),
    }
}
