//! JSON encoding and local staging of the entry batch.
//!
//! The whole batch is encoded as one compact JSON array. `serde_json` writes
//! non-ASCII text literally, so Japanese titles land in the object as UTF-8
//! rather than `\uXXXX` escapes. An empty batch is still written as `[]`.
//!
//! # Staging
//!
//! The encoded bytes are written to a [`NamedTempFile`] and synced to disk
//! before upload. The file is removed when the [`StagedFile`] is closed or
//! dropped, which covers every failure path between staging and upload.

use crate::models::Entry;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, instrument};

/// Encode the entries as a single JSON array.
pub fn encode_entries(entries: &[Entry]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(entries)
}

/// Serialized batch sitting on local disk, waiting for upload.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
    bytes: usize,
}

impl StagedFile {
    /// Path of the staging artifact.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of bytes staged.
    pub fn len(&self) -> usize {
        self.bytes
    }

    /// Delete the staging artifact, reporting any removal error.
    #[instrument(level = "info", skip_all, fields(path = %self.path().display()))]
    pub fn remove(self) -> Result<(), Box<dyn Error>> {
        self.file.close()?;
        info!("Removed staging file");
        Ok(())
    }
}

/// Write the encoded batch to a fresh staging file.
///
/// # Arguments
///
/// * `entries` - The extracted batch, possibly empty
/// * `dir` - Directory for the staging file; the system temp dir when `None`
///
/// # Returns
///
/// A [`StagedFile`] whose contents are already fsynced to disk.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be created,
/// written or synced. Nothing is left on disk in that case.
#[instrument(level = "info", skip_all, fields(count = entries.len()))]
pub fn stage_entries(entries: &[Entry], dir: Option<&Path>) -> Result<StagedFile, Box<dyn Error>> {
    let json = encode_entries(entries)?;

    let mut builder = Builder::new();
    builder.prefix("hatenablog_hotentry_").suffix(".json");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    debug!(path = %file.path().display(), "Created staging file");

    file.write_all(&json)?;
    file.flush()?;
    file.as_file().sync_all()?;

    info!(path = %file.path().display(), bytes = json.len(), "Staged JSON");
    Ok(StagedFile {
        file,
        bytes: json.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn entry(title: &str) -> Entry {
        Entry {
            title: title.to_string(),
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            category: "テクノロジー".to_string(),
            published_date: "2024/01/01".to_string(),
            bookmark_count: "42".to_string(),
        }
    }

    #[test]
    fn test_empty_batch_encodes_as_empty_array() {
        assert_eq!(encode_entries(&[]).unwrap(), b"[]");
    }

    #[test]
    fn test_stage_writes_utf8_json() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![entry("Rustで書くスクレイパー"), entry("Second")];
        let staged = stage_entries(&entries, Some(dir.path())).unwrap();

        let raw = fs::read_to_string(staged.path()).unwrap();
        assert_eq!(raw.len(), staged.len());
        assert!(raw.contains("Rustで書くスクレイパー"));

        let back: Vec<Entry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn test_staged_file_naming() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage_entries(&[], Some(dir.path())).unwrap();

        assert_eq!(staged.path().parent().unwrap(), dir.path());
        let name = staged.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("hatenablog_hotentry_"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage_entries(&[entry("x")], Some(dir.path())).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        staged.remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let staged = stage_entries(&[entry("x")], Some(dir.path())).unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
