//! Getter methods for `CrawlerConfig`
//!
//! Unset options resolve to the defaults in `utils::constants`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::CrawlerConfig;
use crate::crawl_engine::NavigationTiming;
use crate::utils::constants::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_IMAGE_DOWNLOAD_DELAY_MS, DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS,
    DEFAULT_LISTEN_ADDR, DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS,
};

impl CrawlerConfig {
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn admin_url(&self) -> Option<&str> {
        self.admin_url.as_deref()
    }

    #[must_use]
    pub fn connect_url(&self) -> Option<&str> {
        self.connect_url.as_deref()
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Profile directory for a launched browser.
    ///
    /// Defaults to a per-user data directory so the admin session persists.
    #[must_use]
    pub fn chrome_data_dir(&self) -> PathBuf {
        self.chrome_data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("wp-post-crawler")
                .join("chrome-profile")
        })
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(
            self.page_load_timeout_ms
                .unwrap_or(DEFAULT_PAGE_LOAD_TIMEOUT_MS),
        )
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.unwrap_or(DEFAULT_SETTLE_DELAY_MS))
    }

    /// Load-wait and settle durations for the orchestrator
    #[must_use]
    pub fn navigation_timing(&self) -> NavigationTiming {
        NavigationTiming {
            load_timeout: self.page_load_timeout(),
            settle_delay: self.settle_delay(),
        }
    }

    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY)
    }

    #[must_use]
    pub fn image_download_delay(&self) -> Duration {
        Duration::from_millis(
            self.image_download_delay_ms
                .unwrap_or(DEFAULT_IMAGE_DOWNLOAD_DELAY_MS),
        )
    }

    #[must_use]
    pub fn image_request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.image_request_timeout_secs
                .unwrap_or(DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn listen_addr(&self) -> &str {
        self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR)
    }
}
