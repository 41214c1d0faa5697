//! Core CrawlEventBus struct definition and constructors

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::crawl_events::config::EventBusConfig;
use crate::crawl_events::metrics::EventBusMetrics;
use crate::crawl_events::types::CrawlEvent;

/// Best-effort fan-out of crawl notifications.
///
/// There is no replay. An observer that subscribes after an event was
/// published never sees it and has to poll the crawl state instead.
#[derive(Debug, Clone)]
pub struct CrawlEventBus {
    pub(super) sender: broadcast::Sender<CrawlEvent>,
    pub(super) config: Arc<EventBusConfig>,
    pub(super) metrics: EventBusMetrics,
}

impl CrawlEventBus {
    /// Create a new event bus with the specified capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(EventBusConfig {
            capacity,
            ..Default::default()
        })
    }

    /// Create a new event bus with custom configuration
    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity.max(1));
        Self {
            sender,
            config: Arc::new(config),
            metrics: EventBusMetrics::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &EventBusMetrics {
        &self.metrics
    }
}

impl Default for CrawlEventBus {
    fn default() -> Self {
        Self::with_config(EventBusConfig::default())
    }
}
