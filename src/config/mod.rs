//! Process-level configuration
//!
//! `CrawlerConfig` holds what stays fixed for the life of the process:
//! where exports go, how the browser is reached and how long the crawl
//! waits on each page. Per-crawl choices live in `CrawlSettings`.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{CrawlerConfigBuilder, WithOutputDir};
pub use types::CrawlerConfig;
