//! Subscription operations for the CrawlEventBus

use tokio::sync::broadcast;

use crate::crawl_events::streaming::FilteredReceiver;
use crate::crawl_events::types::{CrawlEvent, EventKind};

use super::core::CrawlEventBus;

impl CrawlEventBus {
    /// Subscribe to every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let count = self.sender.receiver_count();
        if self.config.enable_metrics {
            self.metrics.update_subscriber_count(count);
        }
        count
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    /// Create a filtered subscriber that only receives matching events
    pub fn subscribe_filtered<F>(&self, filter: F) -> FilteredReceiver<F>
    where
        F: Fn(&CrawlEvent) -> bool + Send + Sync + 'static,
    {
        FilteredReceiver::new(self.subscribe(), filter)
    }

    /// Subscribe to a single kind of event
    pub fn subscribe_kind(
        &self,
        kind: EventKind,
    ) -> FilteredReceiver<impl Fn(&CrawlEvent) -> bool + Send + Sync + 'static> {
        self.subscribe_filtered(move |event: &CrawlEvent| event.kind() == kind)
    }
}
