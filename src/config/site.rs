//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable overriding `api.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `api.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub logo: String,

    // URL
    pub root: String,

    // Directory
    pub public_dir: String,
    pub languages_dir: String,

    // Date / Time format (date-fns tokens)
    pub date_format: String,

    // Content API
    pub api: ApiConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling.".to_string(),
            language: "pt-BR".to_string(),
            logo: "/Logo.svg".to_string(),

            root: "/".to_string(),

            public_dir: "public".to_string(),
            languages_dir: "languages".to_string(),

            date_format: "dd MMM yyyy".to_string(),

            api: ApiConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides supplied by the hosting environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            tracing::debug!("Using API endpoint from {}", ENDPOINT_ENV);
            self.api.endpoint = Some(endpoint);
        }
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            self.api.access_token = Some(token);
        }
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Repository API endpoint, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub document_type: String,
    pub fetch_fields: Vec<String>,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_token: None,
            document_type: "posts".to_string(),
            fetch_fields: vec![
                "title".to_string(),
                "subtitle".to_string(),
                "author".to_string(),
            ],
            page_size: 1,
            timeout_secs: 30,
            user_agent: format!("spacetraveling/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// The configured endpoint, or a config error when none is set
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no content API endpoint; set api.endpoint or {}",
                    ENDPOINT_ENV
                ))
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fully qualified field names for the `fetch` query parameter
    pub fn fetch_paths(&self) -> Vec<String> {
        self.fetch_fields
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect()
    }
}
