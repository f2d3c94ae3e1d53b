//! Content API access
//!
//! Talks to a hosted headless CMS repository: resolves the master ref,
//! runs predicate searches and follows `next_page` cursors.

mod client;
mod predicate;
mod response;

pub use client::{ApiClient, QueryOptions};
pub use predicate::{query_string, Predicate};
pub use response::{ApiRef, ApiRoot, Document, SearchResponse};
