//! Object storage for the dated output.
//!
//! The pipeline only sees the [`ObjectStore`] trait. [`S3Store`] is the
//! production implementation and is built from an explicit
//! [`StorageConfig`]: the credential profile and region are resolved by the
//! caller and handed in, never read from the environment here.
//!
//! # Credentials
//!
//! - `profile = Some(name)`: the named profile from the shared AWS config files
//! - `profile = None`: the default credential chain (env vars, container or
//!   instance role, default profile)

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Destination for a staged file.
pub trait ObjectStore {
    /// Upload the file at `path` to `bucket` under `key`, replacing any
    /// existing object with that key.
    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), Box<dyn Error>>;
}

/// Settings for building the S3 client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Named credential profile. `None` uses the default chain.
    pub profile: Option<String>,
    /// Region override. `None` uses the region from the environment/profile.
    pub region: Option<String>,
}

/// [`ObjectStore`] backed by Amazon S3.
pub struct S3Store {
    client: Client,
}

impl fmt::Debug for S3Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Store").finish_non_exhaustive()
    }
}

impl S3Store {
    /// Resolve credentials and region from `config` and build a client.
    ///
    /// # Arguments
    ///
    /// * `config` - Credential profile and region; `None` fields fall back to
    ///   the default AWS provider chain
    ///
    /// # Returns
    ///
    /// A store ready for uploads. Credentials are resolved lazily, so a bad
    /// profile surfaces on the first upload rather than here.
    #[instrument(level = "info", skip_all, fields(profile = ?config.profile, region = ?config.region))]
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        info!(region = ?sdk_config.region(), "S3 client ready");

        Self {
            client: Client::new(&sdk_config),
        }
    }
}

impl ObjectStore for S3Store {
    #[instrument(level = "info", skip(self, path), fields(path = %path.display()))]
    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<(), Box<dyn Error>> {
        let t0 = Instant::now();
        let body = ByteStream::from_path(path).await?;

        let res = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/json")
            .body(body)
            .send()
            .await;
        let dt = t0.elapsed();

        match res {
            Ok(out) => {
                info!(
                    elapsed_ms = dt.as_millis() as u64,
                    etag = out.e_tag().unwrap_or_default(),
                    "Uploaded object"
                );
                Ok(())
            }
            Err(e) => {
                error!(elapsed_ms = dt.as_millis() as u64, error = %e, "PutObject failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_ambient_credentials() {
        let config = StorageConfig::default();
        assert!(config.profile.is_none());
        assert!(config.region.is_none());
    }

    #[tokio::test]
    async fn test_connect_applies_region_override() {
        let config = StorageConfig {
            profile: None,
            region: Some("ap-northeast-1".to_string()),
        };
        let store = S3Store::connect(&config).await;
        assert_eq!(
            store.client.config().region().map(|r| r.as_ref()),
            Some("ap-northeast-1")
        );
    }
}
