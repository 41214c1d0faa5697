//! Publishing operations for the CrawlEventBus

use crate::crawl_events::errors::EventBusError;
use crate::crawl_events::types::CrawlEvent;

use super::core::CrawlEventBus;

impl CrawlEventBus {
    /// Publish an event to all subscribers
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of active subscribers that received the event
    /// * `Err(EventBusError::NoSubscribers)` - Nobody is listening; the event is gone
    pub fn publish(&self, event: CrawlEvent) -> Result<usize, EventBusError> {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(subscriber_count) => {
                if self.config.enable_metrics {
                    self.metrics.record(kind, Some(subscriber_count));
                }
                Ok(subscriber_count)
            }
            Err(_) => {
                if self.config.enable_metrics {
                    self.metrics.record(kind, None);
                }
                Err(EventBusError::NoSubscribers)
            }
        }
    }
}
