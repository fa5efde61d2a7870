//! Outward-facing adapters: the HTTP client for the summarization API and
//! the renderers that turn transcript entries into HTML or terminal text.

pub mod http_api;
pub mod markdown;
pub mod render;

pub use http_api::HttpSummarizationApi;
pub use markdown::{escape_html, render_markdown};
