//! PubMed Relevance Ranker - Entry Point
//!
//! Runs one search, prints the ranked table, and optionally writes an export.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pubmed_ranker::config::{Config, api, defaults};
use pubmed_ranker::formatters;
use pubmed_ranker::{PubMedClient, RankReport, Ranker, RunOptions, ScoringProfile, SearchConfiguration};

#[derive(Parser, Debug)]
#[command(name = "pubmed-ranker")]
#[command(about = "Rank PubMed articles by explainable metadata heuristics")]
#[command(version)]
struct Cli {
    /// PubMed search query (date ranges, boolean operators, field tags allowed)
    #[arg(long, default_value = defaults::QUERY)]
    query: String,

    /// File with high-impact journals, one per line (built-in list if omitted)
    #[arg(long)]
    journals: Option<PathBuf>,

    /// File with renowned institutions, one per line (built-in list if omitted)
    #[arg(long)]
    institutions: Option<PathBuf>,

    /// Maximum number of articles to retrieve (at most 250)
    #[arg(long, default_value_t = api::MAX_RESULTS)]
    max_results: usize,

    /// Number of article fetches in flight
    #[arg(long, default_value_t = api::MAX_CONCURRENCY)]
    concurrency: usize,

    /// Stop after this many seconds and report partial results
    #[arg(long)]
    run_timeout: Option<u64>,

    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Write the output to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write a CSV export next to the table (uses the default file name)
    #[arg(long)]
    export: bool,

    /// NCBI API key (optional, enables higher rate limits)
    #[arg(long, env = "NCBI_API_KEY")]
    api_key: Option<String>,

    /// Contact email reported to NCBI
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Markdown table
    #[default]
    Table,
    /// Comma-separated values
    Csv,
    /// JSON report
    Json,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn read_list(path: Option<&PathBuf>, fallback: &str) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read list from {}", path.display())),
        None => Ok(fallback.to_string()),
    }
}

fn render(report: &RankReport, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Table => formatters::format_report_markdown(report),
        OutputFormat::Csv => formatters::format_csv(&report.entries),
        OutputFormat::Json => serde_json::to_string_pretty(&formatters::format_report_json(report))?,
    })
}

/// The table already opens with the summary when it goes to the terminal.
const fn summary_on_stderr(format: OutputFormat, to_file: bool) -> bool {
    to_file || !matches!(format, OutputFormat::Table)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting PubMed ranker");

    let journals = read_list(cli.journals.as_ref(), defaults::JOURNALS)?;
    let institutions = read_list(cli.institutions.as_ref(), defaults::INSTITUTIONS)?;
    let search = SearchConfiguration::new(
        cli.query.clone(),
        ScoringProfile::from_lines(&journals, &institutions),
    )
    .with_max_results(cli.max_results);

    let config = Config::new(cli.api_key.clone())
        .with_email(cli.email.clone())
        .with_max_concurrency(cli.concurrency);
    let options =
        RunOptions::from_config(&config).with_run_timeout(cli.run_timeout.map(Duration::from_secs));
    let client = PubMedClient::new(config)?;
    let ranker = Ranker::new(Arc::new(client), options);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with partial results");
            on_interrupt.cancel();
        }
    });

    let report = match ranker.run_with_cancel(&search, &cancel).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e.to_user_message());
            return Err(e.into());
        }
    };

    if summary_on_stderr(cli.format, cli.output.is_some()) {
        eprintln!("{}", report.summary());
    }

    let rendered = render(&report, cli.format)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{rendered}"),
    }

    if cli.export {
        std::fs::write(defaults::EXPORT_FILE_NAME, formatters::format_csv(&report.entries))
            .with_context(|| format!("failed to write {}", defaults::EXPORT_FILE_NAME))?;
        eprintln!("CSV export written to {}", defaults::EXPORT_FILE_NAME);
    }

    Ok(())
}
