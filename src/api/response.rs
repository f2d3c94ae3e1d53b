//! Raw response shapes of the content API

use serde::Deserialize;
use serde_json::Value;

use crate::content::{Page, Post, PostData};

/// `GET {endpoint}`: repository metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRoot {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

/// A content release reference
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiRoot {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// `GET {endpoint}/documents/search`: one page of documents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub page: u32,
    pub results_per_page: u32,
    pub results_size: u32,
    pub total_results_size: u32,
    pub total_pages: u32,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

/// A document as stored in the repository
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    pub data: Value,
}

impl Document {
    fn text_field(&self, name: &str) -> String {
        self.data
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

impl From<Document> for Post {
    fn from(doc: Document) -> Self {
        let data = PostData {
            title: doc.text_field("title"),
            subtitle: doc.text_field("subtitle"),
            author: doc.text_field("author"),
        };
        Post {
            uid: doc.uid,
            first_publication_date: doc.first_publication_date,
            data,
        }
    }
}

impl From<SearchResponse> for Page {
    fn from(resp: SearchResponse) -> Self {
        Page {
            results: resp.results.into_iter().map(Post::from).collect(),
            next_page: resp.next_page,
        }
    }
}
