//! Output generation for the scraped ranking.
//!
//! # Submodules
//!
//! - [`json`]: Encodes the entry batch as JSON and stages it on local disk
//!   before it is handed to the object store
//!
//! # Output Structure
//!
//! ```text
//! s3://$S3_BUCKET_NAME/
//! └── hatenablog/
//!     ├── hatenablog_hotentry_20250505.json
//!     └── hatenablog_hotentry_20250506.json
//! ```

pub mod json;
