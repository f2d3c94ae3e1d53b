//! HTTP client for the content API

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use super::predicate::{query_string, Predicate};
use super::response::{ApiRoot, SearchResponse};
use crate::config::ApiConfig;
use crate::content::Page;
use crate::error::{Error, Result};
use crate::feed::PageFetcher;

/// Options for a search query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Fully qualified fields to fetch, e.g. `posts.title`
    pub fetch: Vec<String>,
    pub page_size: Option<u32>,
}

/// A client for one content API repository.
///
/// Searches are made against the master ref, which is resolved from the
/// repository root on every query so that newly published content shows up.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let endpoint = self.config.endpoint()?.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", endpoint, path))?;
        if let Some(token) = self.config.access_token.as_deref() {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        Ok(url)
    }

    /// Resolve the ref of the currently published content
    pub async fn master_ref(&self) -> Result<String> {
        let url = self.endpoint_url("")?;
        let root: ApiRoot = self.get_json(url).await?;
        root.master_ref()
            .map(str::to_string)
            .ok_or_else(|| Error::NoMasterRef(self.config.endpoint.clone().unwrap_or_default()))
    }

    /// Run a search query and return the first page of results
    pub async fn query(&self, predicates: &[Predicate], options: &QueryOptions) -> Result<Page> {
        let master_ref = self.master_ref().await?;
        let mut url = self.endpoint_url("/documents/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", &master_ref);
            pairs.append_pair("q", &query_string(predicates));
            if !options.fetch.is_empty() {
                pairs.append_pair("fetch", &options.fetch.join(","));
            }
            if let Some(page_size) = options.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
        }
        let resp: SearchResponse = self.get_json(url).await?;
        Ok(Page::from(resp))
    }

    /// Fetch the page behind a cursor URL exactly as given
    pub async fn get_page(&self, cursor: &str) -> Result<Page> {
        let url = Url::parse(cursor)?;
        let resp: SearchResponse = self.get_json(url).await?;
        Ok(Page::from(resp))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Sending request to {}", url);
        let resp = self.http.get(url.clone()).send().await?;
        match resp.status() {
            status if status.is_success() => {
                debug!("request: {} status: {}", url, status);
                let body = resp.text().await?;
                serde_json::from_str(&body).map_err(|e| Error::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!("request {} rejected, check the access token", url);
                Err(Error::Status {
                    status: resp.status().as_u16(),
                    url: url.to_string(),
                })
            }
            status => {
                error!("request {} status: {}", url, status);
                Err(Error::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl PageFetcher for ApiClient {
    async fn fetch_page(&self, cursor: &str) -> Result<Page> {
        self.get_page(cursor).await
    }
}
