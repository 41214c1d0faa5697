//! Event system for pushing crawl progress to observers
//!
//! Delivery is fire-and-forget. Observers that attach late resynchronise by
//! polling the orchestrator's state.

// Sub-modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod streaming;
pub mod types;

// Re-exports for public API
pub use bus::CrawlEventBus;
pub use config::EventBusConfig;
pub use errors::EventBusError;
pub use metrics::{EventBusMetrics, MetricsSnapshot};
pub use streaming::{FilteredReceiver, StreamItem, event_stream};
pub use types::{CrawlEvent, EventKind};
