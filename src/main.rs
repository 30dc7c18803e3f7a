//! # Hatena Hot Entry
//!
//! A scheduled job that scrapes the Hatena Bookmark IT hot entry ranking and
//! stores the ranked entries as a dated JSON object in S3.
//!
//! ## Usage
//!
//! ```sh
//! S3_BUCKET_NAME=my-bucket hatena_hotentry
//! ```
//!
//! ## Architecture
//!
//! The job is a single linear pipeline:
//! 1. **Fetching**: Download `https://b.hatena.ne.jp/hotentry/it`
//! 2. **Extraction**: Map each contents block to an [`models::Entry`]
//! 3. **Staging**: Write the batch as a JSON array to a local temp file
//! 4. **Upload**: Put it at `hatenablog/hatenablog_hotentry_YYYYMMDD.json`,
//!    dated in Asia/Tokyo
//! 5. **Cleanup**: Remove the staging file
//!
//! On success the handler response is printed to stdout as JSON. Logs go to
//! stderr.

use clap::Parser;
use serde_json::Value;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod handler;
mod models;
mod outputs;
mod scrapers;
mod storage;
mod utils;

use cli::Cli;
use handler::{Pipeline, lambda_handler};
use scrapers::hatena::{HOTENTRY_URL, HttpFetcher};
use storage::S3Store;
use utils::{ZonedClock, ensure_writable_dir};

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hatena_hotentry starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let event: Value = serde_json::from_str(&args.event)?;
    let context: Value = serde_json::from_str(&args.context)?;

    if let Some(dir) = &args.staging_dir {
        ensure_writable_dir(dir)?;
    }

    let pipeline = Pipeline {
        fetcher: HttpFetcher::new(Duration::from_secs(args.http_timeout_secs))?,
        store: S3Store::connect(&args.storage_config()).await,
        clock: ZonedClock::default(),
        bucket: args.bucket.clone(),
        source_url: HOTENTRY_URL.to_string(),
        staging_dir: args.staging_dir.clone(),
        policy: args.on_malformed,
    };

    let response = lambda_handler(&event, &context, &pipeline).await?;
    println!("{}", serde_json::to_string(&response)?);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
