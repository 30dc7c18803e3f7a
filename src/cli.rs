//! Command-line interface definitions for the hot entry job.
//!
//! Every option can also be supplied through the environment, which is how
//! the scheduler configures the job.

use crate::scrapers::hatena::MalformedBlockPolicy;
use crate::storage::StorageConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one scrape-and-store run.
///
/// # Examples
///
/// ```sh
/// # Bucket from the environment, default credentials
/// S3_BUCKET_NAME=my-bucket hatena_hotentry
///
/// # Named profile, keep going past malformed blocks
/// hatena_hotentry --bucket my-bucket --aws-profile scraper --on-malformed skip
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Destination bucket for the dated JSON object
    #[arg(short, long, env = "S3_BUCKET_NAME")]
    pub bucket: String,

    /// Named AWS credential profile (default credential chain when unset)
    #[arg(long, env = "AWS_PROFILE")]
    pub aws_profile: Option<String>,

    /// AWS region override
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Directory for the staging file (system temp dir when unset)
    #[arg(short, long, env = "STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,

    /// What to do with a contents block missing an expected element
    #[arg(long, env = "ON_MALFORMED", value_enum, default_value_t = MalformedBlockPolicy::Abort)]
    pub on_malformed: MalformedBlockPolicy,

    /// Timeout for fetching the ranking page, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Invocation event as JSON (logged only)
    #[arg(long, default_value = "{}")]
    pub event: String,

    /// Invocation context as JSON (logged only)
    #[arg(long, default_value = "{}")]
    pub context: String,
}

impl Cli {
    /// Storage client settings taken from the parsed arguments.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            profile: self.aws_profile.clone(),
            region: self.aws_region.clone(),
        }
    }
}
