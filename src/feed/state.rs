//! Render state snapshots

use serde::Serialize;

use crate::content::{Page, Post};

/// What the listing view shows: every post fetched so far plus the cursor.
///
/// Snapshots are never mutated; a load produces a new one via
/// [`RenderState::extended`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderState {
    #[serde(rename = "results")]
    posts: Vec<Post>,
    next_page: Option<String>,
}

impl RenderState {
    /// Initial state built from the first page
    pub fn from_page(page: Page) -> Self {
        Self {
            posts: page.results,
            next_page: page.next_page,
        }
    }

    /// The posts in fetch order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// The raw cursor as the API returned it
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// The cursor, if it points anywhere
    pub fn cursor(&self) -> Option<&str> {
        self.next_page().filter(|url| !url.is_empty())
    }

    /// Whether the "load more" affordance is shown
    pub fn has_more(&self) -> bool {
        self.cursor().is_some()
    }

    /// Append a fetched page; the cursor is replaced, never merged
    pub fn extended(&self, page: Page) -> Self {
        let mut posts = Vec::with_capacity(self.posts.len() + page.results.len());
        posts.extend_from_slice(&self.posts);
        posts.extend(page.results);
        Self {
            posts,
            next_page: page.next_page,
        }
    }
}
