//! Crawl state and the append-only crawl log
//!
//! There is one `CrawlState` per orchestrator. Only the crawl sequence and
//! the orchestrator's control methods write it; observers get clones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::crawl_types::CrawlSettings;
use crate::page_extractor::PostRecord;

/// Severity of a crawl log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_log_level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warn => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        })
    }
}

/// One crawl log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl LogEntry {
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data,
        }
    }
}

/// Snapshot-able crawl state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CrawlState {
    pub is_running: bool,
    pub total_posts: usize,
    /// Posts whose detailed visit was attempted (or all posts when no visits run)
    pub crawled_posts: usize,
    /// Detailed visits that actually replaced a stub
    pub enriched_posts: usize,
    pub posts: Vec<PostRecord>,
    pub logs: Vec<LogEntry>,
    pub settings: Option<CrawlSettings>,
    pub run_id: Option<Uuid>,
    /// Message of the failure that ended the last crawl
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlState {
    /// Append a log entry and mirror it to the process logger
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>, data: serde_json::Value) {
        let entry = LogEntry::new(level, message, data);
        if entry.data.is_null() {
            log::log!(target: "wp_post_crawler::crawl", level.as_log_level(), "{}", entry.message);
        } else {
            log::log!(
                target: "wp_post_crawler::crawl",
                level.as_log_level(),
                "{} {}",
                entry.message,
                entry.data
            );
        }
        self.logs.push(entry);
    }

    /// Reset for a newly accepted crawl
    pub(crate) fn begin(&mut self, settings: CrawlSettings, run_id: Uuid) {
        *self = Self {
            is_running: true,
            settings: Some(settings),
            run_id: Some(run_id),
            started_at: Some(Utc::now()),
            ..Self::default()
        };
    }

    /// Whether the crawl ended with a fatal error
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.is_running && self.error.is_some()
    }
}
