//! Data models for scraped ranking entries and the handler response.
//!
//! - [`Entry`]: One ranked item from the hot entry page
//! - [`HandlerResponse`]: Status payload returned to the scheduler
//!
//! `Entry` keeps the wire names used by the dated objects already sitting in
//! the bucket (`contents_published_date`, `bookmark_users`), so downstream
//! readers see the same shape day to day.

use serde::{Deserialize, Serialize};

/// A single ranked item scraped from one contents block.
///
/// All fields are kept as the page displays them. The date is not parsed
/// and the bookmark count is not coerced to an integer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// The headline text of the entry link.
    pub title: String,
    /// Link target of the entry headline, as written on the page.
    pub url: String,
    /// Source site label shown next to the entry.
    pub domain: String,
    /// Hatena category label (e.g. "テクノロジー").
    pub category: String,
    /// Publication date as displayed on the page, e.g. `2024/01/01`.
    #[serde(rename = "contents_published_date", alias = "published_date")]
    pub published_date: String,
    /// Bookmark user count as displayed on the page, e.g. `42`.
    #[serde(rename = "bookmark_users", alias = "bookmark_count")]
    pub bookmark_count: String,
}

/// Message placed in the response body after a successful run.
pub const COMPLETED_MESSAGE: &str = "Scraping and upload to S3 completed!";

/// Response handed back to the scheduler.
///
/// `body` is itself JSON: the completion message encoded as a JSON string,
/// quotes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    /// The `200` response for a completed scrape and upload.
    pub fn completed() -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(COMPLETED_MESSAGE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entry {
        Entry {
            title: "生成AIで変わる開発現場".to_string(),
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            category: "テクノロジー".to_string(),
            published_date: "2024/01/01".to_string(),
            bookmark_count: "42".to_string(),
        }
    }

    #[test]
    fn test_entry_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();

        assert!(keys.contains(&"contents_published_date"));
        assert!(keys.contains(&"bookmark_users"));
        assert!(!keys.contains(&"published_date"));
        assert_eq!(obj["bookmark_users"], "42");
    }

    #[test]
    fn test_entry_json_keeps_non_ascii_literal() {
        let json = serde_json::to_string(&vec![sample()]).unwrap();
        assert!(json.contains("生成AIで変わる開発現場"));
        assert!(!json.contains("\\u"));

        let back: Vec<Entry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![sample()]);
    }

    #[test]
    fn test_entry_accepts_field_names_as_aliases() {
        let json = r#"{
            "title": "Foo",
            "url": "https://example.com/a",
            "domain": "example.com",
            "category": "Tech",
            "published_date": "2024/01/01",
            "bookmark_count": "42"
        }"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.published_date, "2024/01/01");
        assert_eq!(entry.bookmark_count, "42");
    }

    #[test]
    fn test_completed_response() {
        let resp = HandlerResponse::completed().unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, "\"Scraping and upload to S3 completed!\"");

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["statusCode"], 200);
    }
}
