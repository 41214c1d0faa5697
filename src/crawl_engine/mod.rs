//! Crawl Engine Module
//!
//! The orchestrator state machine, the navigation controller it drives each
//! detailed visit through, and the state and settings types they share.

// Sub-modules
pub mod crawl_types;
pub mod edit_link;
pub mod navigation;
pub mod orchestrator;
pub mod state;

// Re-export crawl types
pub use crawl_types::{CrawlError, CrawlResult, CrawlSettings, SettingsError, StartRejected};

// Re-export orchestration types
pub use edit_link::derive_edit_url;
pub use navigation::{NavigationOutcome, NavigationTiming, navigate_and_wait, settle};
pub use orchestrator::CrawlOrchestrator;
pub use state::{CrawlState, LogEntry, LogLevel};
