//! Configuration for the event bus

use crate::utils::constants::DEFAULT_EVENT_CAPACITY;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Maximum number of events buffered per receiver before it lags
    pub capacity: usize,
    /// Whether to enable event metrics collection
    pub enable_metrics: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
            enable_metrics: true,
        }
    }
}
