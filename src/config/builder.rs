//! Type-safe builder for `CrawlerConfig` using the typestate pattern
//!
//! `build()` only exists once the output directory is set.

use anyhow::{Context, Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::CrawlerConfig;

// Type states for the builder
pub struct WithOutputDir;

pub struct CrawlerConfigBuilder<State = ()> {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) admin_url: Option<String>,
    pub(crate) connect_url: Option<String>,
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) headless: bool,
    pub(crate) page_load_timeout_ms: Option<u64>,
    pub(crate) settle_delay_ms: Option<u64>,
    pub(crate) event_capacity: Option<usize>,
    pub(crate) image_download_delay_ms: Option<u64>,
    pub(crate) image_request_timeout_secs: Option<u64>,
    pub(crate) listen_addr: Option<String>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CrawlerConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            admin_url: None,
            connect_url: None,
            chrome_data_dir: None,
            // The admin login usually needs a visible window the first time
            headless: false,
            page_load_timeout_ms: None,
            settle_delay_ms: None,
            event_capacity: None,
            image_download_delay_ms: None,
            image_request_timeout_secs: None,
            listen_addr: None,
            _phantom: PhantomData,
        }
    }
}

impl CrawlerConfig {
    /// Create a builder for configuring a `CrawlerConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> CrawlerConfigBuilder<()> {
        CrawlerConfigBuilder::default()
    }
}

impl<S> CrawlerConfigBuilder<S> {
    fn transition<T>(self) -> CrawlerConfigBuilder<T> {
        CrawlerConfigBuilder {
            output_dir: self.output_dir,
            admin_url: self.admin_url,
            connect_url: self.connect_url,
            chrome_data_dir: self.chrome_data_dir,
            headless: self.headless,
            page_load_timeout_ms: self.page_load_timeout_ms,
            settle_delay_ms: self.settle_delay_ms,
            event_capacity: self.event_capacity,
            image_download_delay_ms: self.image_download_delay_ms,
            image_request_timeout_secs: self.image_request_timeout_secs,
            listen_addr: self.listen_addr,
            _phantom: PhantomData,
        }
    }

    #[must_use]
    pub fn admin_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        // Bare hosts are assumed to be served over https
        self.admin_url = Some(if url.starts_with("http://") || url.starts_with("https://") {
            url
        } else {
            format!("https://{url}")
        });
        self
    }

    #[must_use]
    pub fn connect_url(mut self, url: Option<String>) -> Self {
        self.connect_url = url;
        self
    }

    #[must_use]
    pub fn chrome_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.chrome_data_dir = dir;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn page_load_timeout_ms(mut self, ms: u64) -> Self {
        self.page_load_timeout_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn image_download_delay_ms(mut self, ms: u64) -> Self {
        self.image_download_delay_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn image_request_timeout_secs(mut self, secs: u64) -> Self {
        self.image_request_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }
}

impl CrawlerConfigBuilder<()> {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> CrawlerConfigBuilder<WithOutputDir> {
        self.output_dir = Some(dir.into());
        self.transition()
    }
}

impl CrawlerConfigBuilder<WithOutputDir> {
    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Fails when the output directory cannot be made absolute, when the
    /// connect URL is not a websocket URL, or when the event capacity is zero.
    pub fn build(self) -> Result<CrawlerConfig> {
        let output_dir = self
            .output_dir
            .ok_or_else(|| anyhow!("output_dir is required"))?;
        let output_dir = std::path::absolute(&output_dir)
            .with_context(|| format!("Invalid output directory: {}", output_dir.display()))?;

        if let Some(url) = self.connect_url.as_deref()
            && !(url.starts_with("ws://") || url.starts_with("wss://"))
        {
            return Err(anyhow!(
                "connect_url must be a DevTools websocket URL (ws:// or wss://), got '{url}'"
            ));
        }

        if self.event_capacity == Some(0) {
            return Err(anyhow!("event_capacity must be greater than zero"));
        }

        Ok(CrawlerConfig {
            output_dir,
            admin_url: self.admin_url,
            connect_url: self.connect_url,
            chrome_data_dir: self.chrome_data_dir,
            headless: self.headless,
            page_load_timeout_ms: self.page_load_timeout_ms,
            settle_delay_ms: self.settle_delay_ms,
            event_capacity: self.event_capacity,
            image_download_delay_ms: self.image_download_delay_ms,
            image_request_timeout_secs: self.image_request_timeout_secs,
            listen_addr: self.listen_addr,
        })
    }
}
