//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped in a path segment (RFC 3986 unreserved ones pass)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/Logo.svg") // -> "/blog/Logo.svg"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Link to a single post page, `None` when the post has no uid
pub fn post_url(config: &SiteConfig, uid: Option<&str>) -> Option<String> {
    uid.filter(|u| !u.is_empty())
        .map(|uid| url_for(config, &format!("post/{}", encode_url(uid))))
}

/// Encode a URL path segment
pub fn encode_url(path: &str) -> String {
    utf8_percent_encode(path, PATH_SEGMENT).to_string()
}
