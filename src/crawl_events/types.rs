//! Event type definitions for the crawl event system
//!
//! Three notifications leave the orchestrator: one `progress` per detailed
//! visit and exactly one terminal `complete` or `error`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::crawl_engine::LogEntry;
use crate::page_extractor::PostRecord;

/// Notifications pushed to observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum CrawlEvent {
    /// A detailed visit finished (successfully or not)
    Progress {
        run_id: Uuid,
        current: usize,
        total: usize,
        post: PostRecord,
        timestamp: DateTime<Utc>,
    },
    /// The crawl finished; carries the final post list and the full log
    Complete {
        run_id: Uuid,
        posts: Vec<PostRecord>,
        logs: Vec<LogEntry>,
        timestamp: DateTime<Utc>,
    },
    /// Enumeration failed and the crawl was abandoned
    Error {
        run_id: Uuid,
        message: String,
        logs: Vec<LogEntry>,
        timestamp: DateTime<Utc>,
    },
}

/// Event discriminant, used for filtering subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Progress,
    Complete,
    Error,
}

impl EventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "progress" => Ok(Self::Progress),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown event kind '{other}'")),
        }
    }
}

/// Helper functions for creating events
impl CrawlEvent {
    #[must_use]
    pub fn progress(run_id: Uuid, current: usize, total: usize, post: PostRecord) -> Self {
        Self::Progress {
            run_id,
            current,
            total,
            post,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn complete(run_id: Uuid, posts: Vec<PostRecord>, logs: Vec<LogEntry>) -> Self {
        Self::Complete {
            run_id,
            posts,
            logs,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn error(run_id: Uuid, message: impl Into<String>, logs: Vec<LogEntry>) -> Self {
        Self::Error {
            run_id,
            message: message.into(),
            logs,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Progress { .. } => EventKind::Progress,
            Self::Complete { .. } => EventKind::Complete,
            Self::Error { .. } => EventKind::Error,
        }
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Progress { run_id, .. }
            | Self::Complete { run_id, .. }
            | Self::Error { run_id, .. } => *run_id,
        }
    }

    /// Whether this event ends a crawl
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}
