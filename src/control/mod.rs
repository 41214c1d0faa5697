//! Polling control API

pub mod commands;
pub mod server;

pub use commands::{ControlError, ControlMessage, ControlReply, CrawlController, TabInfo, TabResolver};
pub use server::{router, serve};
