//! Crawl posts out of a logged-in WordPress admin through a Chrome tab.
//!
//! The [`CrawlOrchestrator`] enumerates posts on an admin list page, can
//! open each post's editor for full content, and publishes progress on a
//! [`CrawlEventBus`]. The [`control`] module exposes start, stop, clear and
//! state polling over HTTP.

pub mod app;
pub mod browser_setup;
pub mod cli;
pub mod config;
pub mod content_saver;
pub mod control;
pub mod crawl_engine;
pub mod crawl_events;
pub mod logging;
pub mod page_extractor;
pub mod tab;
pub mod utils;

pub use browser_setup::{BrowserSession, download_managed_browser, find_browser_executable};
pub use config::CrawlerConfig;
pub use control::{ControlMessage, ControlReply, CrawlController};
pub use crawl_engine::{
    CrawlError, CrawlOrchestrator, CrawlResult, CrawlSettings, CrawlState, LogEntry, LogLevel,
};
pub use crawl_events::{CrawlEvent, CrawlEventBus, EventKind};
pub use page_extractor::{PageSnapshot, PostRecord, PostStatus};
pub use tab::{ChromiumTab, TabDriver};
