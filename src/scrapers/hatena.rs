//! Hatena Bookmark hot entry scraper.
//!
//! Scrapes the [IT hot entry ranking](https://b.hatena.ne.jp/hotentry/it).
//! Every ranked item lives in its own `.entrylist-contents-main` block:
//!
//! ```text
//! .entrylist-contents-main
//! ├── .entrylist-contents-title    > a[href]   -> title, url
//! ├── .entrylist-contents-domain   > a         -> domain
//! ├── .entrylist-contents-meta
//! │   ├── .entrylist-contents-category > a     -> category
//! │   └── .entrylist-contents-date             -> published_date
//! └── .entrylist-contents-users    > a > span  -> bookmark_count
//! ```
//!
//! Lookups return `Option` and a missing step becomes one [`ExtractError`]
//! for the block. What happens next is decided by [`MalformedBlockPolicy`].

use crate::models::Entry;
use clap::ValueEnum;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::{ParseError, Url};

/// The ranking page scraped on every run.
pub const HOTENTRY_URL: &str = "https://b.hatena.ne.jp/hotentry/it";

static CONTENTS_MAIN: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-main"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-title"));
static DOMAIN: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-domain"));
static META: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-meta"));
static CATEGORY: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-category"));
static DATE: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-date"));
static USERS: Lazy<Selector> = Lazy::new(|| selector(".entrylist-contents-users"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static LABEL: Lazy<Selector> = Lazy::new(|| selector("span"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Source of raw ranking page markup.
pub trait PageSource {
    /// Download the markup behind `url`.
    ///
    /// Network failures and non-success statuses are errors; nothing is retried.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// [`PageSource`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the crate user agent and a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let status = response.status();
        let html = response.text().await?;
        info!(%status, bytes = html.len(), "Fetched ranking page");
        Ok(html)
    }
}

/// What to do with a contents block that is missing an expected element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MalformedBlockPolicy {
    /// Fail the whole run on the first malformed block.
    #[default]
    Abort,
    /// Log the malformed block and continue with the next one.
    Skip,
}

/// Failure to map one contents block to an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// An expected region or nested element was not found.
    MissingElement { block: usize, path: &'static str },
    /// The element was found but lacks a required attribute.
    MissingAttribute {
        block: usize,
        path: &'static str,
        attr: &'static str,
    },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::MissingElement { block, path } => {
                write!(f, "contents block {block}: missing `{path}`")
            }
            ExtractError::MissingAttribute { block, path, attr } => {
                write!(f, "contents block {block}: `{path}` has no `{attr}` attribute")
            }
        }
    }
}

impl Error for ExtractError {}

/// Extract every entry on the ranking page, in document order.
///
/// # Arguments
///
/// * `document` - The parsed ranking page
/// * `base` - The page URL, used only to resolve relative links
/// * `policy` - What to do with a block missing an expected element
///
/// # Returns
///
/// One [`Entry`] per contents block, in the order the blocks appear.
///
/// # Errors
///
/// Under [`MalformedBlockPolicy::Abort`] the first malformed block fails the
/// whole batch. Under [`MalformedBlockPolicy::Skip`] this never errors.
#[instrument(level = "info", skip_all, fields(%base, ?policy))]
pub fn extract_entries(
    document: &Html,
    base: &Url,
    policy: MalformedBlockPolicy,
) -> Result<Vec<Entry>, ExtractError> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (index, block) in document.select(&CONTENTS_MAIN).enumerate() {
        match extract_entry(block, index, base) {
            Ok(entry) => {
                debug!(index, title = %entry.title, "Extracted entry");
                entries.push(entry);
            }
            Err(e) => match policy {
                MalformedBlockPolicy::Abort => return Err(e),
                MalformedBlockPolicy::Skip => {
                    warn!(error = %e, "Skipping malformed contents block");
                    skipped += 1;
                }
            },
        }
    }

    info!(count = entries.len(), skipped, "Extracted hot entries");
    Ok(entries)
}

/// Map a single contents block to an [`Entry`].
fn extract_entry(block: ElementRef<'_>, index: usize, base: &Url) -> Result<Entry, ExtractError> {
    let missing = |path| ExtractError::MissingElement { block: index, path };

    let title_link = find(block, &TITLE)
        .and_then(|title| find(title, &LINK))
        .ok_or_else(|| missing("entrylist-contents-title a"))?;
    let href = title_link
        .value()
        .attr("href")
        .ok_or(ExtractError::MissingAttribute {
            block: index,
            path: "entrylist-contents-title a",
            attr: "href",
        })?;
    let url = resolve_href(base, href);

    let domain = find(block, &DOMAIN)
        .and_then(|domain| find(domain, &LINK))
        .ok_or_else(|| missing("entrylist-contents-domain a"))?;

    let meta = find(block, &META).ok_or_else(|| missing("entrylist-contents-meta"))?;
    let category = find(meta, &CATEGORY)
        .and_then(|category| find(category, &LINK))
        .ok_or_else(|| missing("entrylist-contents-meta entrylist-contents-category a"))?;
    let date = find(meta, &DATE)
        .ok_or_else(|| missing("entrylist-contents-meta entrylist-contents-date"))?;

    let bookmarks = find(block, &USERS)
        .and_then(|users| find(users, &LINK))
        .and_then(|link| find(link, &LABEL))
        .ok_or_else(|| missing("entrylist-contents-users a span"))?;

    Ok(Entry {
        title: stripped_text(title_link),
        url,
        domain: stripped_text(domain),
        category: stripped_text(category),
        published_date: stripped_text(date),
        bookmark_count: stripped_text(bookmarks),
    })
}

/// Link target as stored in the entry.
///
/// Absolute links are kept byte for byte. Relative links are joined onto
/// `base`. A link that cannot be parsed either way is kept as written.
fn resolve_href(base: &Url, href: &str) -> String {
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(ParseError::RelativeUrlWithoutBase) => match base.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(%href, error = %e, "Keeping unresolvable relative link as written");
                href.to_string()
            }
        },
        Err(e) => {
            warn!(%href, error = %e, "Keeping unparseable link as written");
            href.to_string()
        }
    }
}

/// First descendant of `scope` matching `selector`, in document order.
fn find<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Visible text of an element: every text node trimmed, blanks dropped,
/// the rest concatenated.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}
