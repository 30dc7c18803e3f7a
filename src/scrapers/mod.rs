//! Ranking page scrapers.
//!
//! Each scraper follows the same two-phase pattern:
//!
//! 1. **Fetching**: Download the raw markup of the ranking page
//! 2. **Extraction**: Walk the parsed document and map every contents block
//!    to a structured record
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Hatena Bookmark | [`hatena`] | HTML scraping | IT hot entry ranking |

pub mod hatena;
