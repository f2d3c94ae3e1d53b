//! Helper functions for templates
//!
//! URL generation and date formatting used when turning posts into
//! template data.

mod date;
mod url;

pub use date::*;
pub use url::*;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::Result;

/// Collection of helpers bound to a site configuration
#[derive(Debug, Clone)]
pub struct Helpers {
    config: SiteConfig,
}

impl Helpers {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    /// Get url_for helper
    pub fn url_for(&self, path: &str) -> String {
        url_for(&self.config, path)
    }

    /// Link to a post, if it has a uid
    pub fn post_url(&self, post: &Post) -> Option<String> {
        post_url(&self.config, post.uid.as_deref())
    }

    /// Display form of a post's publication date
    pub fn post_date(&self, post: &Post) -> Result<String> {
        display_date(
            post.published_at().as_ref(),
            &self.config.date_format,
            &self.config.language,
        )
    }

    /// Machine-readable form of a post's publication date
    pub fn post_datetime(&self, post: &Post) -> Option<String> {
        post.published_at().map(|d| date_xml(&d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_helpers() {
        let helpers = Helpers::new(SiteConfig::default());
        let post = Post::new("a", Some("2021-03-25T19:25:28+0000"), "T1", "S1", "A1");
        assert_eq!(helpers.post_url(&post).as_deref(), Some("/post/a"));
        assert_eq!(helpers.post_date(&post).unwrap(), "25 Mar 2021");
        assert_eq!(
            helpers.post_datetime(&post).as_deref(),
            Some("2021-03-25T19:25:28+00:00")
        );
    }

    #[test]
    fn test_post_without_date() {
        let helpers = Helpers::new(SiteConfig::default());
        let post = Post::new("a", None, "T1", "S1", "A1");
        assert_eq!(helpers.post_date(&post).unwrap(), "");
        assert!(helpers.post_datetime(&post).is_none());
    }
}
