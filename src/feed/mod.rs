//! Listing state and "load more" pagination

mod loader;
mod state;

pub use loader::{Feed, LoadOutcome, PageFetcher};
pub use state::RenderState;
