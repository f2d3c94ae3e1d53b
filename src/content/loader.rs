//! Build-time loading of the first page of posts

use crate::api::{ApiClient, Predicate, QueryOptions};
use crate::content::Page;
use crate::error::Result;

/// Loads the initial page of posts from the content API
pub struct ContentLoader<'a> {
    client: &'a ApiClient,
}

impl<'a> ContentLoader<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Query the configured document type, fetching only the listing fields.
    ///
    /// The returned page holds at most `page_size` posts and mirrors the
    /// API's cursor as-is.
    pub async fn load_first_page(&self) -> Result<Page> {
        let config = self.client.config();
        let options = QueryOptions {
            fetch: config.fetch_paths(),
            page_size: Some(config.page_size),
        };

        tracing::debug!(
            "Querying documents of type {} (pageSize={})",
            config.document_type,
            config.page_size
        );
        let page = self
            .client
            .query(&[Predicate::document_type(&config.document_type)], &options)
            .await?;

        let results = page.results.into_iter().map(|p| p.normalized()).collect();
        let page = Page::new(results, page.next_page);

        tracing::info!(
            "Loaded {} posts (more available: {})",
            page.results.len(),
            page.has_more()
        );
        Ok(page)
    }
}
