use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotrank_rss::config::Config;
use hotrank_rss::fetcher::{FetchError, Fetcher};
use hotrank_rss::output::{resolve_output_path, write_document};
use hotrank_rss::rss::build_rss;

#[derive(Parser, Debug)]
#[command(name = "hotrank-rss", version, about = "Render the 36kr hot ranking as an RSS feed")]
struct Cli {
    /// Output file, relative to the working directory unless absolute
    #[arg(long, value_name = "PATH", default_value = "rss.xml")]
    out: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout only carries the final confirmation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotrank_rss=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            if let Some(fetch_err) = err.downcast_ref::<FetchError>() {
                if let Some(status) = fetch_err.status() {
                    error!(status, "Last HTTP status");
                }
                if let Some(payload) = fetch_err.payload() {
                    error!(payload, "Last response body");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env();
    let retry = &config.fetch.retry;
    info!(
        max_attempts = retry.attempts(),
        base_delay_ms = retry.base_delay_ms,
        max_delay_ms = retry.max_delay_ms,
        "Loaded retry policy"
    );

    let root = std::env::current_dir().context("failed to determine working directory")?;
    let path = resolve_output_path(&root, &cli.out);

    let fetcher = Fetcher::new(config.fetch)?;
    let items = fetcher.fetch_hot_rank().await?;

    let xml = build_rss(&items)?;
    let bytes = write_document(&path, &xml)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} ({} bytes)", path.display(), bytes);
    Ok(())
}
