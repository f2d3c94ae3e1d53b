//! Content models and loading

pub mod loader;
mod post;

pub use loader::ContentLoader;
pub use post::{Page, Post, PostData};
