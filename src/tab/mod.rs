//! The browser tab a crawl drives
//!
//! The orchestrator only needs four capabilities from a tab: listen for
//! load completion, navigate, read its URL and take a DOM snapshot.
//! [`ChromiumTab`] provides them over the DevTools protocol.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::page_extractor::PageSnapshot;

pub use chromium::ChromiumTab;

/// Stream that yields once per load-complete event.
///
/// Dropping the stream unregisters the listener.
pub type LoadListener = BoxStream<'static, ()>;

#[async_trait]
pub trait TabDriver: Send + Sync {
    /// Stable identifier of the tab (the DevTools target id)
    fn id(&self) -> &str;

    async fn current_url(&self) -> Result<String>;

    /// Register a load-complete listener
    async fn subscribe_load(&self) -> Result<LoadListener>;

    /// Start navigating to `url` without waiting for the load to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Run the snapshot script against the current document
    async fn snapshot(&self) -> Result<PageSnapshot>;
}
