//! Transport-independent control commands
//!
//! Four commands drive a crawl: start, poll state, stop and clear. The
//! controller resolves the target tab, checks that it shows a WordPress
//! admin page, then hands the request to the orchestrator.

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::browser_setup::BrowserSession;
use crate::crawl_engine::{CrawlOrchestrator, CrawlSettings, CrawlState};
use crate::tab::TabDriver;
use crate::utils::constants::WP_ADMIN_MARKER;

/// An open tab as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: String,
    pub url: String,
}

/// Finds the tab a crawl should drive
#[async_trait]
pub trait TabResolver: Send + Sync {
    /// The tab with `tab_id`, or the first WordPress admin tab when `None`
    async fn resolve(&self, tab_id: Option<&str>) -> Result<Arc<dyn TabDriver>, ControlError>;

    async fn list(&self) -> Result<Vec<TabInfo>, ControlError>;
}

#[async_trait]
impl TabResolver for BrowserSession {
    async fn resolve(&self, tab_id: Option<&str>) -> Result<Arc<dyn TabDriver>, ControlError> {
        let tab = match tab_id {
            Some(id) => self
                .tab_by_id(id)
                .await?
                .ok_or_else(|| ControlError::TabNotFound(id.to_string()))?,
            None => self.find_admin_tab().await?.ok_or(ControlError::NoAdminTab)?,
        };
        Ok(Arc::new(tab))
    }

    async fn list(&self) -> Result<Vec<TabInfo>, ControlError> {
        let mut infos = Vec::new();
        for tab in self.tabs().await? {
            let url = tab.current_url().await.unwrap_or_default();
            infos.push(TabInfo {
                id: tab.id().to_string(),
                url,
            });
        }
        Ok(infos)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("No tab with id {0}")]
    TabNotFound(String),

    #[error("No open tab shows a WordPress admin page")]
    NoAdminTab,

    #[error("Please navigate to WordPress admin posts page (tab is on {0})")]
    NotAdminPage(String),

    #[error("Browser error: {0:#}")]
    Browser(#[from] anyhow::Error),
}

/// Command envelope, tagged by `action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlMessage {
    StartCrawl {
        #[serde(default)]
        settings: CrawlSettings,
        #[serde(default)]
        tab_id: Option<String>,
    },
    GetCrawlState,
    StopCrawl,
    ClearState,
}

impl ControlMessage {
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::StartCrawl { .. } => "startCrawl",
            Self::GetCrawlState => "getCrawlState",
            Self::StopCrawl => "stopCrawl",
            Self::ClearState => "clearState",
        }
    }
}

/// Command response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    Accepted {
        accepted: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    State {
        state: CrawlState,
    },
}

impl ControlReply {
    fn accepted() -> Self {
        Self::Accepted {
            accepted: true,
            message: None,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self::Accepted {
            accepted: false,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { accepted: true, .. })
    }
}

#[derive(Clone)]
pub struct CrawlController {
    orchestrator: CrawlOrchestrator,
    tabs: Arc<dyn TabResolver>,
}

impl CrawlController {
    pub fn new(orchestrator: CrawlOrchestrator, tabs: Arc<dyn TabResolver>) -> Self {
        Self { orchestrator, tabs }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &CrawlOrchestrator {
        &self.orchestrator
    }

    pub async fn handle(&self, message: ControlMessage) -> Result<ControlReply, ControlError> {
        log::info!("Message received: {}", message.action());
        match message {
            ControlMessage::StartCrawl { settings, tab_id } => {
                self.start_crawl(settings, tab_id.as_deref()).await
            }
            ControlMessage::GetCrawlState => Ok(self.get_state()),
            ControlMessage::StopCrawl => Ok(self.stop_crawl()),
            ControlMessage::ClearState => Ok(self.clear_state()),
        }
    }

    /// Resolve the tab and ask the orchestrator to start.
    ///
    /// A rejected start (running crawl, no status selected) is a normal
    /// reply with `accepted: false`. Tab problems are errors.
    pub async fn start_crawl(
        &self,
        settings: CrawlSettings,
        tab_id: Option<&str>,
    ) -> Result<ControlReply, ControlError> {
        if let Err(e) = settings.validate() {
            return Ok(ControlReply::rejected(e.to_string()));
        }

        let tab = self.tabs.resolve(tab_id).await?;
        let url = tab
            .current_url()
            .await
            .with_context(|| format!("Failed to read URL of tab {}", tab.id()))?;
        if !url.contains(WP_ADMIN_MARKER) {
            return Err(ControlError::NotAdminPage(url));
        }

        Ok(match self.orchestrator.try_start(settings, tab) {
            Ok(run_id) => {
                log::info!("Crawl {run_id} started in background");
                ControlReply::accepted()
            }
            Err(reason) => ControlReply::rejected(reason.to_string()),
        })
    }

    #[must_use]
    pub fn get_state(&self) -> ControlReply {
        ControlReply::State {
            state: self.orchestrator.get_state(),
        }
    }

    #[must_use]
    pub fn stop_crawl(&self) -> ControlReply {
        self.orchestrator.stop();
        ControlReply::accepted()
    }

    #[must_use]
    pub fn clear_state(&self) -> ControlReply {
        log::info!("Clearing crawl state");
        self.orchestrator.clear();
        ControlReply::accepted()
    }

    pub async fn list_tabs(&self) -> Result<Vec<TabInfo>, ControlError> {
        self.tabs.list().await
    }
}
