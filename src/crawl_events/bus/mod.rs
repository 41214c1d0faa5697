//! Event bus for publishing and subscribing to crawl events

// Core struct and constructors
mod core;

// Functionality implementations
mod publishing;
mod subscription;

// Re-export the main type
pub use core::CrawlEventBus;
