//! The scheduled job: fetch the ranking, extract entries, store the batch.
//!
//! One call to [`lambda_handler`] performs exactly one run:
//!
//! 1. Fetch the ranking page markup
//! 2. Extract the entries from the parsed document
//! 3. Stage the JSON batch on local disk
//! 4. Upload it under the dated key
//! 5. Remove the staging file
//!
//! Any failure ends the run before the upload happens, or fails the upload
//! itself. There is no partial output.

use crate::models::HandlerResponse;
use crate::outputs::json::stage_entries;
use crate::scrapers::hatena::{self, MalformedBlockPolicy, PageSource};
use crate::storage::ObjectStore;
use crate::utils::{Clock, object_key, truncate_for_log};
use scraper::Html;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use url::Url;

/// Everything one run needs, wired up by the caller.
#[derive(Debug)]
pub struct Pipeline<F, S, C> {
    pub fetcher: F,
    pub store: S,
    pub clock: C,
    pub bucket: String,
    pub source_url: String,
    pub staging_dir: Option<PathBuf>,
    pub policy: MalformedBlockPolicy,
}

impl<F, S, C> Pipeline<F, S, C>
where
    F: PageSource,
    S: ObjectStore,
    C: Clock,
{
    /// Run the job once and return the key that was written.
    #[instrument(level = "info", skip_all, fields(bucket = %self.bucket, source = %self.source_url))]
    pub async fn run(&self) -> Result<String, Box<dyn Error>> {
        let base = Url::parse(&self.source_url)?;

        let html = self.fetcher.fetch(&self.source_url).await?;
        debug!(preview = %truncate_for_log(&html, 200), "Ranking page markup");

        let entries = {
            let document = Html::parse_document(&html);
            hatena::extract_entries(&document, &base, self.policy)?
        };

        let staged = stage_entries(&entries, self.staging_dir.as_deref())?;
        let key = object_key(self.clock.today());
        info!(%key, count = entries.len(), bytes = staged.len(), "Uploading hot entries");

        self.store.upload_file(&self.bucket, &key, staged.path()).await?;
        staged.remove()?;

        Ok(key)
    }
}

/// Scheduler entry point.
///
/// `event` and `context` are accepted as delivered and only logged.
#[instrument(level = "info", skip_all)]
pub async fn lambda_handler<F, S, C>(
    event: &Value,
    context: &Value,
    pipeline: &Pipeline<F, S, C>,
) -> Result<HandlerResponse, Box<dyn Error>>
where
    F: PageSource,
    S: ObjectStore,
    C: Clock,
{
    debug!(%event, %context, "Invocation received");
    let t0 = Instant::now();

    match pipeline.run().await {
        Ok(key) => {
            info!(%key, elapsed_ms = t0.elapsed().as_millis() as u64, "Run complete");
            Ok(HandlerResponse::completed()?)
        }
        Err(e) => {
            error!(error = %e, elapsed_ms = t0.elapsed().as_millis() as u64, "Run failed");
            Err(e)
        }
    }
}
