//! `TabDriver` over a chromiumoxide page

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::{EventLoadEventFired, NavigateParams};
use futures::StreamExt;

use super::{LoadListener, TabDriver};
use crate::page_extractor::PageSnapshot;
use crate::page_extractor::js_scripts::SNAPSHOT_SCRIPT;

/// An admin tab in a Chrome instance
#[derive(Debug, Clone)]
pub struct ChromiumTab {
    page: Page,
    id: String,
}

impl ChromiumTab {
    #[must_use]
    pub fn new(page: Page) -> Self {
        let id = page.target_id().inner().clone();
        Self { page, id }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl TabDriver for ChromiumTab {
    fn id(&self) -> &str {
        &self.id
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("Failed to read tab URL")?
            .unwrap_or_default();
        Ok(url)
    }

    async fn subscribe_load(&self) -> Result<LoadListener> {
        let events = self
            .page
            .event_listener::<EventLoadEventFired>()
            .await
            .context("Failed to register load listener")?;
        Ok(events.map(|_| ()).boxed())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .with_context(|| format!("Failed to navigate to {url}"))?;

        // Net errors still leave the tab on an error page; the load wait
        // and extraction decide what happens next.
        if let Some(error_text) = response.result.error_text.as_deref() {
            log::warn!("Navigation to {url} reported: {error_text}");
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<PageSnapshot> {
        self.page
            .evaluate(SNAPSHOT_SCRIPT)
            .await
            .context("Failed to evaluate snapshot script")?
            .into_value::<PageSnapshot>()
            .context("Failed to parse page snapshot")
    }
}
