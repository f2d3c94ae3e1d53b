//! Post and Page models

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A blog post as returned by the content API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Document uid, absent only in malformed data
    #[serde(default)]
    pub uid: Option<String>,

    /// ISO 8601 publication timestamp
    #[serde(default)]
    pub first_publication_date: Option<String>,

    /// Display fields
    pub data: PostData,
}

/// The fields fetched for each post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl Post {
    /// Create a post from its display fields
    pub fn new(
        uid: impl Into<String>,
        first_publication_date: Option<&str>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            uid: Some(uid.into()),
            first_publication_date: first_publication_date.map(str::to_string),
            data: PostData {
                title: title.into(),
                subtitle: subtitle.into(),
                author: author.into(),
            },
        }
    }

    /// Re-assert the publication date; an empty string counts as null.
    pub fn normalized(self) -> Self {
        let first_publication_date = self.first_publication_date.filter(|d| !d.is_empty());
        Self {
            first_publication_date,
            ..self
        }
    }

    /// Parse the publication date.
    ///
    /// Accepts RFC 3339, the `+0000` offset style the content API emits,
    /// and bare `YYYY-MM-DD` dates (taken as midnight UTC).
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.first_publication_date.as_deref()?.trim();

        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date);
        }
        for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
            if let Ok(date) = DateTime::parse_from_str(raw, format) {
                return Some(date);
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().fixed_offset())
    }
}

/// One batch of posts plus the cursor to the next batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Posts in API order
    #[serde(default)]
    pub results: Vec<Post>,

    /// URL of the next page; absent or empty when exhausted
    #[serde(default)]
    pub next_page: Option<String>,
}

impl Page {
    pub fn new(results: Vec<Post>, next_page: Option<String>) -> Self {
        Self { results, next_page }
    }

    /// The cursor, if it points anywhere
    pub fn cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|url| !url.is_empty())
    }

    pub fn has_more(&self) -> bool {
        self.cursor().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_decode_page() {
        let json = r#"{
            "page": 2,
            "results_per_page": 1,
            "next_page": null,
            "results": [{
                "id": "YFzP",
                "uid": "b",
                "type": "posts",
                "first_publication_date": "2021-03-25T19:25:28+0000",
                "data": {"title": "T2", "subtitle": "S2", "author": "A2", "banner": {}}
            }]
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].uid.as_deref(), Some("b"));
        assert_eq!(page.results[0].data.author, "A2");
        assert!(!page.has_more());
    }

    #[test]
    fn test_missing_fields_default() {
        let page: Page = serde_json::from_str(r#"{"results": [{"data": {}}]}"#).unwrap();
        let post = &page.results[0];
        assert!(post.uid.is_none());
        assert!(post.first_publication_date.is_none());
        assert_eq!(post.data, PostData::default());
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_empty_cursor_is_exhausted() {
        let page = Page::new(vec![], Some(String::new()));
        assert!(page.cursor().is_none());
        assert!(!page.has_more());

        let page = Page::new(vec![], Some("https://api/page2".to_string()));
        assert_eq!(page.cursor(), Some("https://api/page2"));
    }

    #[test]
    fn test_normalized_keeps_post() {
        let post = Post::new("a", Some("2021-01-01"), "T1", "S1", "A1");
        assert_eq!(post.clone().normalized(), post);

        let blank = Post::new("a", Some(""), "T1", "S1", "A1").normalized();
        assert!(blank.first_publication_date.is_none());
    }

    #[test]
    fn test_published_at() {
        let api_style = Post::new("a", Some("2021-03-25T19:25:28+0000"), "", "", "");
        let date = api_style.published_at().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 25));

        let rfc = Post::new("a", Some("2021-03-25T19:25:28Z"), "", "", "");
        assert_eq!(rfc.published_at().unwrap().day(), 25);

        let bare = Post::new("a", Some("2021-01-01"), "", "", "");
        assert_eq!(bare.published_at().unwrap().month(), 1);

        let garbage = Post::new("a", Some("yesterday"), "", "", "");
        assert!(garbage.published_at().is_none());

        let null = Post::new("a", None, "", "", "");
        assert!(null.published_at().is_none());
    }
}
