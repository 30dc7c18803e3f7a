//! Utility functions for run dates, object keys, logging and the file system.
//!
//! - Date lookup in the target timezone behind the [`Clock`] trait
//! - Storage key derivation for the dated output object
//! - String truncation for log previews
//! - Staging directory validation

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Timezone whose calendar date names the output object.
pub const TARGET_TZ: Tz = chrono_tz::Asia::Tokyo;

/// Prefix shared by every object the job writes.
pub const KEY_PREFIX: &str = "hatenablog/hatenablog_hotentry_";

/// Source of "today" for naming the output object.
pub trait Clock {
    /// The current calendar date in the clock's timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock read in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for ZonedClock {
    fn default() -> Self {
        Self::new(TARGET_TZ)
    }
}

impl Clock for ZonedClock {
    fn today(&self) -> NaiveDate {
        let now = Utc::now().with_timezone(&self.tz);
        debug!(%now, tz = %self.tz, "Read wall clock");
        now.date_naive()
    }
}

/// Clock pinned to a single date.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

#[cfg(test)]
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Storage key for the snapshot taken on `date`.
///
/// # Examples
///
/// ```ignore
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(object_key(date), "hatenablog/hatenablog_hotentry_20240101.json");
/// ```
pub fn object_key(date: NaiveDate) -> String {
    format!("{}{}.json", KEY_PREFIX, date.format("%Y%m%d"))
}

/// Truncate a string for logging purposes.
///
/// Cuts on a character boundary, so multi-byte text (the ranking page is
/// mostly Japanese) never splits a code point.
///
/// # Returns
///
/// The original string if it has at most `max` characters, otherwise the
/// first `max` characters with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path)?;
    let probe_path = path.join("..__probe_write__");
    drop(fs::File::create(&probe_path)?);
    if let Err(e) = fs::remove_file(&probe_path) {
        warn!(path = %probe_path.display(), error = %e, "Failed to remove write probe");
    }
    info!("Staging directory is writable");
    Ok(())
}
