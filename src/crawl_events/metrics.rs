use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::types::EventKind;

/// Lock-free counters for event bus operations.
#[derive(Debug, Clone, Default)]
pub struct EventBusMetrics {
    pub events_delivered: Arc<AtomicU64>,
    /// Events published while no observer was attached
    pub events_undelivered: Arc<AtomicU64>,
    pub progress_events: Arc<AtomicU64>,
    pub terminal_events: Arc<AtomicU64>,
    pub active_subscribers: Arc<AtomicUsize>,
    pub peak_subscribers: Arc<AtomicUsize>,
}

impl EventBusMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: EventKind, receivers: Option<usize>) {
        match kind {
            EventKind::Progress => self.progress_events.fetch_add(1, Ordering::SeqCst),
            EventKind::Complete | EventKind::Error => {
                self.terminal_events.fetch_add(1, Ordering::SeqCst)
            }
        };
        match receivers {
            Some(count) => {
                self.events_delivered.fetch_add(1, Ordering::SeqCst);
                self.update_subscriber_count(count);
            }
            None => {
                self.events_undelivered.fetch_add(1, Ordering::SeqCst);
                self.update_subscriber_count(0);
            }
        }
    }

    pub fn update_subscriber_count(&self, count: usize) {
        self.active_subscribers.store(count, Ordering::SeqCst);
        let _ = self.peak_subscribers.fetch_max(count, Ordering::SeqCst);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_delivered: self.events_delivered.load(Ordering::SeqCst),
            events_undelivered: self.events_undelivered.load(Ordering::SeqCst),
            progress_events: self.progress_events.load(Ordering::SeqCst),
            terminal_events: self.terminal_events.load(Ordering::SeqCst),
            active_subscribers: self.active_subscribers.load(Ordering::SeqCst),
            peak_subscribers: self.peak_subscribers.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub events_delivered: u64,
    pub events_undelivered: u64,
    pub progress_events: u64,
    pub terminal_events: u64,
    pub active_subscribers: usize,
    pub peak_subscribers: usize,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn total_events(&self) -> u64 {
        self.events_delivered + self.events_undelivered
    }
}
