//! Core types for crawl operations.
//!
//! Settings supplied per crawl, the error types raised inside the crawl
//! sequence and the reasons a start request can be turned away.

use serde::{Deserialize, Serialize};

use crate::page_extractor::PostStatus;

/// Immutable per-crawl settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlSettings {
    pub include_published: bool,
    pub include_drafts: bool,
    pub include_pending: bool,
    pub include_scheduled: bool,
    /// Maximum number of list rows to keep, 0 means unbounded
    pub limit: u32,
    /// Drop redirected posts once all visits are done
    pub skip_redirects: bool,
    /// Open every stub's editor for full content
    pub visit_pages: bool,
    pub remove_shortcodes: bool,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            include_published: true,
            include_drafts: false,
            include_pending: false,
            include_scheduled: false,
            limit: 0,
            skip_redirects: true,
            visit_pages: false,
            remove_shortcodes: false,
        }
    }
}

impl CrawlSettings {
    /// Check the caller-side precondition: at least one status is selected.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoStatusSelected`] when all four include flags are off.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.include_published
            || self.include_drafts
            || self.include_pending
            || self.include_scheduled
        {
            Ok(())
        } else {
            Err(SettingsError::NoStatusSelected)
        }
    }

    /// Whether a list row with this status passes the include flags
    #[must_use]
    pub fn includes(&self, status: PostStatus) -> bool {
        match status {
            PostStatus::Publish => self.include_published,
            PostStatus::Draft => self.include_drafts,
            PostStatus::Pending => self.include_pending,
            PostStatus::Future => self.include_scheduled,
            PostStatus::Private | PostStatus::Unknown => false,
        }
    }

    /// Settings used to re-run extraction on a single post's editor:
    /// every status, one record, same shortcode handling
    #[must_use]
    pub fn detailed(&self) -> Self {
        Self {
            include_published: true,
            include_drafts: true,
            include_pending: true,
            include_scheduled: true,
            limit: 1,
            skip_redirects: false,
            visit_pages: false,
            remove_shortcodes: self.remove_shortcodes,
        }
    }

    /// `limit` as a row cap, `None` when unbounded
    #[must_use]
    pub fn row_cap(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit as usize)
    }
}

/// Invalid crawl settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Please select at least one post status to crawl")]
    NoStatusSelected,
}

/// Why a start request was not accepted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartRejected {
    #[error("Crawl already in progress")]
    AlreadyRunning,
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),
}

/// Errors raised inside the crawl sequence
#[derive(Debug, Clone, thiserror::Error)]
pub enum CrawlError {
    /// Initial enumeration failed; the whole crawl is abandoned
    #[error("Failed to get initial post list: {message}")]
    Enumeration {
        message: String,
        stack: Option<String>,
    },
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;
