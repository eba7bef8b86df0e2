//! Binary entry point for `hashtag-bot`.
//!
//! This module provides the command-line interface for hashtag-bot with options
//! for configuration file paths, the watched repository, and logging verbosity.
//! It initializes the necessary components and starts the service.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};
use hashtag_bot::base::{config::Config, types::Void};

/// Hashtag-bot: expands `#123` mentions in Slack into GitHub issue cards.
///
/// Configuration can come from `config.toml` or `HASHTAG_BOT_*` environment
/// variables. The process exits with a non-zero code when the chat credential
/// is rejected, the connection is lost, a card cannot be posted, or the
/// initial issue fetch fails.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// TOML file holding the Slack and GitHub tokens (optional).
    ///
    /// Falls back to `.hidden/config.toml` when present; `HASHTAG_BOT_*`
    /// variables fill in whatever the file leaves out.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Owner of the GitHub repository to watch (overrides `github_owner`).
    #[arg(short, long, visible_alias = "user")]
    owner: Option<String>,
    /// Name of the GitHub repository to watch (overrides `github_repo`).
    #[arg(short, long)]
    repo: Option<String>,
    /// Log more (-v, -vv).
    ///
    /// - No flag: connection state, cache refreshes and misses
    /// - -v: also skipped messages, unposted misses and cache evictions
    /// - -vv or more: everything, including Slack client internals
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main entry point for the hashtag-bot binary.
///
/// Installs stdout and OTLP tracing, resolves the watched repository and tokens,
/// then hands over to the runtime until the chat connection ends.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // One level filter for both layers, from the `-v` count.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Compact stdout logs; spans show how long fetches and posts take.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Export the same spans over OTLP/HTTP (standard `OTEL_EXPORTER_OTLP_*` variables).

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("hashtag-bot");
    let otel = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref(), args.owner, args.repo)?;

    hashtag_bot::start(config).await
}
